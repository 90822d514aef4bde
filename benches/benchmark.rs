// Performance benchmarks for the feature derivation stages
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use featx_core::{Column, RecordTable, Vector};
use featx_similarity::{token_sort_ratio, EmbeddingGenerator, EmbeddingStats, HashEmbedder};
use featx_storage::OneHotEncoder;
use rand::prelude::*;
use std::sync::Arc;

const TITLES: &[&str] = &[
    "Engenheiro de Software",
    "Analista de Dados Sênior",
    "Consultor SAP FI",
    "Desenvolvedor Java Pleno",
    "Gerente de Projetos",
    "Cientista de Dados",
];

const LEVELS: &[&str] = &[
    "Ensino Médio Completo",
    "Superior Incompleto",
    "Superior Completo",
    "Pós Graduação",
    "Mestrado",
    "Doutorado",
];

fn generate_random_vector(dim: usize) -> Vector {
    let mut rng = rand::rng();
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    Vector::new(data)
}

fn random_title(rng: &mut impl Rng) -> &'static str {
    TITLES[rng.random_range(0..TITLES.len())]
}

fn benchmark_token_sort_ratio(c: &mut Criterion) {
    let mut rng = rand::rng();
    let pairs: Vec<(&str, &str)> = (0..1000)
        .map(|_| (random_title(&mut rng), random_title(&mut rng)))
        .collect();

    c.bench_function("token_sort_ratio_1000", |b| {
        b.iter(|| {
            for (left, right) in &pairs {
                black_box(token_sort_ratio(left, right));
            }
        });
    });
}

fn benchmark_embedding_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("embedding_stats");

    for dim in [384, 768].iter() {
        let vectors: Vec<Vector> = (0..1000).map(|_| generate_random_vector(*dim)).collect();
        group.bench_with_input(BenchmarkId::new("from_vector", dim), dim, |b, _| {
            b.iter(|| {
                for v in &vectors {
                    black_box(EmbeddingStats::from_vector(v));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_hash_embeddings(c: &mut Criterion) {
    let generator = EmbeddingGenerator::new(Arc::new(HashEmbedder::default()), 128).unwrap();
    let mut rng = rand::rng();
    let texts: Vec<Option<&str>> = (0..512).map(|_| Some(random_title(&mut rng))).collect();

    c.bench_function("hash_aggregate_512", |b| {
        b.iter(|| black_box(generator.aggregate(&texts).unwrap()));
    });
}

fn benchmark_one_hot(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_hot");

    for size in [1000, 10000].iter() {
        let mut rng = rand::rng();
        let values: Vec<Option<&str>> = (0..*size)
            .map(|_| {
                if rng.random_bool(0.05) {
                    None
                } else {
                    Some(LEVELS[rng.random_range(0..LEVELS.len())])
                }
            })
            .collect();
        let table = RecordTable::from_columns(vec![Column::utf8("nivel_academico", values)]).unwrap();
        let encoder = OneHotEncoder::fit(&table, "nivel_academico", "nivel_acad").unwrap();

        group.bench_with_input(BenchmarkId::new("transform", size), size, |b, _| {
            b.iter(|| black_box(encoder.transform(&table).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_token_sort_ratio,
    benchmark_embedding_stats,
    benchmark_hash_embeddings,
    benchmark_one_hot
);
criterion_main!(benches);
