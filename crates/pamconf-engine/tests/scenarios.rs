use pamconf_engine::filters::{by_class, by_module};
use pamconf_engine::{
    Action, Category, Configuration, Control, ControlKeyword, Directive, DirectiveKind, Editor,
    Entry, Format, ModuleClass, Parser, ReturnCode, Rule, Writer,
};
use pamconf_syntax::{format_arguments, parse_arguments};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn parse(input: &str) -> Configuration {
    Parser::new().parse_str(input, Format::PerService).unwrap()
}

fn modules(config: &Configuration) -> Vec<&str> {
    config.rules().map(|rule| rule.module.as_str()).collect()
}

fn categories(config: &Configuration) -> Vec<String> {
    config
        .rules()
        .map(|rule| rule.category.to_string())
        .collect()
}

#[test]
fn simple_rules() {
    let config = parse("auth required pam_unix.so nullok\naccount required pam_unix.so\n");

    assert_eq!(config.len(), 2);
    let rule = config.rules().next().unwrap();
    assert_eq!(rule.category, Category::new(ModuleClass::Auth));
    assert_eq!(rule.control, Control::simple(ControlKeyword::Required));
    assert_eq!(rule.module, "pam_unix.so");
    assert_eq!(rule.arguments, vec!["nullok"]);
}

#[test]
fn complex_control() {
    let config = parse("auth [success=ok default=bad] pam_unix.so");

    assert_eq!(
        config.rules().next().unwrap().control,
        Control::complex([
            (ReturnCode::Success, Action::Ok),
            (ReturnCode::Default, Action::Bad),
        ])
    );
}

#[test]
fn include_directive_round_trips() {
    let config = parse("@include common-auth # Auth");

    assert_eq!(
        config.entries,
        vec![Entry::Directive(Directive {
            kind: DirectiveKind::Include,
            target: "common-auth".into(),
            arguments: vec![],
            comment: Some("Auth".into()),
            line: 1,
        })]
    );
    assert_eq!(
        Writer::new().write_string(&config),
        "@include common-auth # Auth\n"
    );
}

#[test]
fn bracketed_query_argument_round_trips() {
    let input = "auth required pam_mysql.so [query=SELECT * FROM t WHERE x='%u']";
    let config = parse(input);
    let written = Writer::new().write_string(&config);
    let reparsed = parse(&written);

    assert_eq!(written, format!("{input}\n"));
    assert_eq!(
        reparsed.rules().next().unwrap().arguments,
        vec!["query=SELECT * FROM t WHERE x='%u'"]
    );
}

#[test]
fn sort_orders_categories() {
    let mut config = parse(
        "session required pam_s.so\nauth required pam_a.so\npassword required pam_p.so\naccount required pam_c.so\n",
    );

    Editor::new(&mut config).sort_by_category();

    assert_eq!(categories(&config), vec!["account", "auth", "password", "session"]);
}

#[test]
fn insert_before_first_pam_unix() {
    let mut config = parse(
        "auth required pam_env.so\n\
         auth [success=1 default=ignore] pam_unix.so nullok\n\
         auth requisite pam_deny.so\n\
         account required pam_unix.so\n",
    );
    let before = config.clone();

    let rule = Rule::new(
        ModuleClass::Auth,
        Control::simple(ControlKeyword::Requisite),
        "pam_nologin.so",
    );
    let at = Editor::new(&mut config)
        .insert_before(rule.clone(), by_module("pam_unix"))
        .unwrap();

    assert_eq!(at, 1);
    assert_eq!(config.entries[1], Entry::Rule(rule));
    let mut without = config.clone();
    without.entries.remove(1);
    assert_eq!(without, before);
}

#[test]
fn sorting_is_idempotent_and_stable() {
    let mut config = parse(
        "session required pam_s1.so\n\
         auth required pam_a1.so\n\
         -session optional pam_s2.so\n\
         @include common-auth\n\
         auth sufficient pam_a2.so\n\
         session-noninteractive required pam_n.so\n\
         account required pam_c1.so\n\
         session optional pam_s3.so\n\
         account sufficient pam_c2.so\n",
    );
    let is_session = by_class(ModuleClass::Session);
    let sessions_before: Vec<Entry> = config
        .entries
        .iter()
        .filter(|&entry| is_session(entry))
        .cloned()
        .collect();

    let mut editor = Editor::new(&mut config);
    editor.sort_by_category();
    let once = editor.snapshot();
    editor.sort_by_category();

    assert_eq!(config, once);
    assert_eq!(
        modules(&config),
        vec![
            "pam_c1.so",
            "pam_c2.so",
            "pam_a1.so",
            "pam_a2.so",
            "pam_s1.so",
            "pam_s2.so",
            "pam_s3.so",
            "pam_n.so"
        ]
    );
    assert!(config.entries.last().unwrap().is_directive());

    let sessions_after: Vec<Entry> = config
        .entries
        .iter()
        .filter(|&entry| is_session(entry))
        .cloned()
        .collect();
    assert_eq!(sessions_after, sessions_before);
}

#[test]
fn add_places_auth_between_account_and_session() {
    let mut config = parse(
        "account required pam_c1.so\naccount required pam_c2.so\nsession required pam_s.so\n",
    );

    let at = Editor::new(&mut config).add_entry(Rule::new(
        ModuleClass::Auth,
        Control::simple(ControlKeyword::Required),
        "pam_unix.so",
    ));

    assert_eq!(at, 2);
    assert_eq!(categories(&config), vec!["account", "account", "auth", "session"]);
}

#[test]
fn writer_output_matches_editor_sort() {
    let mut config = parse(
        "@include common-auth\nsession required pam_s.so\nauth required pam_a.so\n",
    );
    let unsorted = Writer::new().write_string(&config);

    Editor::new(&mut config).sort_by_category();

    assert_eq!(Writer::new().write_string(&config), unsorted);
    assert!(config.entries[2].is_directive());
}

#[rstest]
#[case("two words")]
#[case("tab\tseparated")]
#[case("[bracketed]")]
#[case("a]b")]
#[case("open[")]
#[case("x=[y z]")]
#[case("query=SELECT * FROM t WHERE x='%u'")]
#[case("a b\\")]
#[case("a\\[b c")]
#[case(r"C:\Program Files\")]
#[case(r"trailing\")]
#[case("a [x] b#c")]
fn argument_escaping_round_trips(#[case] arg: &str) {
    assert_eq!(parse_arguments(&format_arguments(&[arg])), vec![arg]);
}

#[test]
fn escaped_arguments_survive_a_full_line() {
    let args = ["a b", "c]d", "e[f", "plain", r"g\[h i", r"dir\"];
    let mut config = Configuration::new(Format::PerService);
    Editor::new(&mut config).add_entry(
        Rule::new(
            ModuleClass::Session,
            Control::simple(ControlKeyword::Optional),
            "pam_x.so",
        )
        .with_arguments(args),
    );

    let reparsed = parse(&Writer::new().write_string(&config));

    assert_eq!(reparsed.rules().next().unwrap().arguments, args);
}

#[test]
fn parse_error_names_the_line() {
    let err = Parser::new()
        .parse_str(
            "auth required pam_unix.so\naccount [success] pam_unix.so\n",
            Format::PerService,
        )
        .unwrap_err();

    assert_eq!(err.line(), 2);
    assert!(err.to_string().starts_with("line 2: malformed control '[success]'"));
}
