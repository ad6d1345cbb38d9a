use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use xcfg::{from_xml_str, Document, WriteOptions};

const SIMPLE_XML: &str = "<config><debug>false</debug></config>";
const ATTR_XML: &str = "<config version=\"2\" owner='ops'><item id=\"42\">x</item></config>";

fn wide_document() -> Document {
    let mut doc = Document::new();
    let root = doc.add_section("config");
    for i in 0..200 {
        root.add_section("job")
            .add_child("name", format!("job-{i}"))
            .add_child("retries", i % 5);
    }
    doc
}

fn bench_simple(c: &mut Criterion) {
    c.bench_function("xcfg_xml_simple", |b| {
        b.iter(|| from_xml_str(black_box(SIMPLE_XML)))
    });
}

fn bench_attr(c: &mut Criterion) {
    c.bench_function("xcfg_xml_attr", |b| {
        b.iter(|| from_xml_str(black_box(ATTR_XML)))
    });
}

fn bench_wide(c: &mut Criterion) {
    let doc = wide_document();
    let text = doc.to_xml(WriteOptions::pretty());

    c.bench_function("xcfg_xml_write_wide", |b| {
        b.iter(|| black_box(&doc).to_xml(WriteOptions::pretty()))
    });
    c.bench_function("xcfg_xml_parse_wide", |b| {
        b.iter(|| from_xml_str(black_box(&text)))
    });
    c.bench_function("xcfg_xml_find_section_wide", |b| {
        b.iter(|| {
            black_box(&doc)
                .find_section("config")
                .map(|config| config.sections_where("name", "job-199").count())
        })
    });
}

criterion_group!(benches, bench_simple, bench_attr, bench_wide);
criterion_main!(benches);
