use criterion::{Criterion, criterion_group, criterion_main};
use pamconf_engine::{Editor, Format, Parser, Writer};

fn generate_service_file(blocks: usize) -> String {
    let base = "# block\n\
        auth [success=2 default=ignore] pam_unix.so nullok try_first_pass\n\
        auth requisite pam_deny.so\n\
        account required pam_unix.so\n\
        password [success=1 default=ignore] pam_unix.so obscure yescrypt \\\n    use_authtok\n\
        session optional pam_mysql.so [query=SELECT * FROM sessions WHERE user='%u']\n\
        -session optional pam_systemd.so\n\
        @include common-session\n";
    base.repeat(blocks)
}

fn bench_parse_and_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let content = generate_service_file(200);
    let parser = Parser::new();
    let writer = Writer::new();

    group.bench_function("parse", |b| {
        b.iter(|| {
            let config = parser
                .parse_str(std::hint::black_box(&content), Format::PerService)
                .unwrap();
            std::hint::black_box(config);
        });
    });

    let config = parser.parse_str(&content, Format::PerService).unwrap();
    group.bench_function("write", |b| {
        b.iter(|| std::hint::black_box(writer.write_string(std::hint::black_box(&config))));
    });

    group.bench_function("write_pretty", |b| {
        b.iter(|| std::hint::black_box(writer.write_pretty_string(std::hint::black_box(&config))));
    });

    group.bench_function("sort", |b| {
        b.iter(|| {
            let mut copy = config.deep_copy();
            Editor::new(&mut copy).sort_by_category();
            std::hint::black_box(copy);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse_and_write);
criterion_main!(benches);
