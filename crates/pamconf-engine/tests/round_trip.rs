use pamconf_engine::{Configuration, Entry, Format, Parser, Writer, grouped_order};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn grouped(config: &Configuration) -> Vec<&Entry> {
    grouped_order(&config.entries)
        .into_iter()
        .map(|i| &config.entries[i])
        .collect()
}

/// Parse, write and parse again; the second model must hold the same
/// entries in grouped order, and writing it again must not change the text.
fn assert_round_trip(input: &str, format: Format) {
    let parser = Parser::new();
    let writer = Writer::new();

    let first = parser.parse_str(input, format).unwrap();
    let text = writer.write_string(&first);
    let second = parser.parse_str(&text, format).unwrap();

    let expected = grouped(&first);
    assert_eq!(second.len(), expected.len(), "entry count changed:\n{text}");
    for (before, after) in expected.iter().zip(&second.entries) {
        assert!(
            before.same_content(after),
            "{before:?}\nbecame\n{after:?}\nin:\n{text}"
        );
    }
    assert_eq!(second.comments, first.comments);
    assert_eq!(
        second.directives().count(),
        first.directives().count(),
        "include count changed"
    );
    assert_eq!(writer.write_string(&second), text);
}

#[rstest]
#[case("sshd.pam", Format::PerService)]
#[case("common-auth.pam", Format::PerService)]
#[case("mysql.pam", Format::PerService)]
#[case("pam.conf", Format::MultiService)]
fn fixtures_round_trip(#[case] name: &str, #[case] format: Format) {
    assert_round_trip(&fixture(name), format);
}

#[test]
fn long_rules_round_trip_through_folding() {
    let args: Vec<String> = (0..30).map(|i| format!("[opt{i}=v {i}]")).collect();
    let input = format!("password required pam_long.so {}\n", args.join(" "));
    assert_round_trip(&input, Format::PerService);
}

#[test]
fn sshd_is_regrouped() {
    let config = Parser::new()
        .parse_str(&fixture("sshd.pam"), Format::PerService)
        .unwrap();

    assert_eq!(config.rules().count(), 10);
    assert_eq!(
        config
            .directives()
            .map(|d| d.target.as_str())
            .collect::<Vec<_>>(),
        vec![
            "common-auth",
            "common-account",
            "common-session",
            "common-password"
        ]
    );

    insta::assert_snapshot!(Writer::new().write_string(&config), @r"
    # PAM configuration for the Secure Shell service
    # Standard Un*x authentication.
    # Disallow non-root logins when /etc/nologin exists.
    # Standard Un*x authorization.
    # SELinux needs to be the first session rule.
    account required pam_nologin.so

    session [default=bad ignore=ignore module_unknown=ignore success=ok] pam_selinux.so close
    session required pam_loginuid.so
    session optional pam_keyinit.so force revoke
    session optional pam_motd.so motd=/run/motd.dynamic
    session optional pam_motd.so noupdate
    session optional pam_mail.so standard noenv # [1]
    session required pam_limits.so
    session required pam_env.so user_readenv=1 envfile=/etc/default/locale
    session [default=bad ignore=ignore module_unknown=ignore success=ok] pam_selinux.so open
    @include common-auth
    @include common-account
    @include common-session
    @include common-password
    ");
}

#[test]
fn common_auth_pretty() {
    let config = Parser::new()
        .parse_str(&fixture("common-auth.pam"), Format::PerService)
        .unwrap();

    let folded = config.rules().find(|rule| rule.continuation).unwrap();
    assert_eq!(folded.module, "pam_systemd_home.so");
    assert_eq!(folded.arguments, vec!["debug"]);
    assert_eq!(folded.line, 8);

    insta::assert_snapshot!(Writer::new().write_pretty_string(&config), @r"
    # /etc/pam.d/common-auth - authentication settings common to all services
    auth   [default=ignore success=2]  pam_unix.so          nullok
    auth   [default=ignore success=1]  pam_sss.so           use_first_pass
    auth   requisite                   pam_deny.so
    auth   required                    pam_permit.so
    -auth  optional                    pam_systemd_home.so  debug
    auth   optional                    pam_cap.so
    ");
}

#[test]
fn multi_service_keeps_service_column() {
    let config = Parser::new()
        .parse_str(&fixture("pam.conf"), Format::MultiService)
        .unwrap();

    insta::assert_snapshot!(Writer::new().write_string(&config), @r"
    # /etc/pam.conf - all services in one file
    login account required pam_unix.so

    login auth requisite pam_securetty.so
    login auth required pam_unix.so nullok
    sshd auth required pam_unix.so
    other auth required pam_deny.so

    other password required pam_deny.so

    login session required pam_unix.so
    sshd -session optional pam_systemd.so
    ");
}

#[test]
fn bracketed_arguments_survive() {
    let config = Parser::new()
        .parse_str(&fixture("mysql.pam"), Format::PerService)
        .unwrap();

    let rule = config.rules().next().unwrap();
    assert_eq!(
        rule.arguments,
        vec![
            "user=pam",
            "passwd=secret",
            "query=SELECT user FROM users WHERE user='%u' AND active=1",
            "where=a]b",
        ]
    );
}
