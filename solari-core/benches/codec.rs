use criterion::{black_box, criterion_group, criterion_main, Criterion};
use solari_core::{codec::ContentCodec, Content, Profile};

fn bench_codec(c: &mut Criterion) {
    let profile = Profile::solari_26();
    let codec = ContentCodec::new(&profile);
    let content = Content {
        train_type: Some("Os".into()),
        num: Some(4712.into()),
        num_red: true,
        destination: Some("Břeclav".into()),
        direction1: Some("Vranovice".into()),
        direction2: Some("S3".into()),
        time: Some("16:05".into()),
        delay: Some("1:35".into()),
    };
    let units = codec.encode(&content).unwrap();

    let mut group = c.benchmark_group("codec");
    group.bench_function("encode", |b| {
        b.iter(|| codec.encode(black_box(&content)).unwrap());
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(codec.decode(black_box(&units))));
    });
    group.bench_function("validate_profile", |b| {
        b.iter(|| black_box(&profile).validate().unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
