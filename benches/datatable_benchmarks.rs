use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use datatable::*;

const FIRST: [&str; 8] = ["Alice", "Bob", "Malika", "Dan", "Eve", "Frank", "Grace", "Heidi"];
const STATUS: [&str; 3] = ["single", "complicated", "relationship"];

fn users(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let name = format!("{} {}", FIRST[i % FIRST.len()], i);
            Row::new(i)
                .with("email", format!("user{}@example.com", i))
                .with("name", name)
                .with("age", (18 + i % 60) as i64)
                .with("status", STATUS[i % STATUS.len()])
        })
        .collect()
}

fn columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::display("select").sortable(false).hideable(false),
        ColumnSpec::accessor("name").filter_variant(FilterVariant::Fuzzy),
        ColumnSpec::accessor("email"),
        ColumnSpec::accessor("age").filter_variant(FilterVariant::Range),
        ColumnSpec::accessor("status").filter_variant(FilterVariant::Select),
    ]
}

fn bench_rank_item(c: &mut Criterion) {
    let options = RankOptions::default();
    let cases = [
        ("starts_with", "Malika Alvarez", "mal"),
        ("acronym", "North-West Airlines", "nwa"),
        ("closeness", "playground equipment", "plgnd"),
        ("no_match", "playground equipment", "xyz"),
    ];

    let mut group = c.benchmark_group("rank_item");
    for (name, value, query) in cases.iter() {
        let cell = CellValue::from(*value);
        group.bench_function(*name, |b| {
            b.iter(|| rank_item(black_box(&cell), black_box(query), &options));
        });
    }
    group.finish();
}

fn bench_global_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("global_filter");

    for size in [100, 1000, 10000].iter() {
        let mut table = TableController::new(columns(), users(*size), TableOptions::default()).unwrap();
        let mut toggle = false;

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                toggle = !toggle;
                table.set_global_filter(if toggle { "ali" } else { "mal" });
                black_box(table.filtered_row_count())
            });
        });
    }
    group.finish();
}

fn bench_multi_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_sort");

    for size in [100, 1000, 10000].iter() {
        let mut table = TableController::new(columns(), users(*size), TableOptions::default()).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                table.set_sorting(vec![SortKey::ascending("status"), SortKey::descending("age"), SortKey::ascending("name")]);
                black_box(table.page_rows().len())
            });
        });
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export_csv");

    for size in [100, 1000, 10000].iter() {
        let table = TableController::new(columns(), users(*size), TableOptions::default()).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(table.export().unwrap().len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rank_item, bench_global_filter, bench_multi_sort, bench_export);
criterion_main!(benches);
