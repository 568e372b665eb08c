use criterion::{Criterion, black_box, criterion_group, criterion_main};

use lecturebank::engine::filter::filter_sets;
use lecturebank::quiz::model::{QuestionSet, QuestionStyle, SetId};

fn make_history(count: usize) -> Vec<QuestionSet> {
    let topics = [
        "Cell biology",
        "Photosynthesis",
        "Organic chemistry",
        "Thermodynamics",
        "Cell membranes",
        "Genetics",
    ];
    (0..count)
        .map(|i| QuestionSet {
            id: SetId::new(i.to_string()),
            topic: format!("{} {}", topics[i % topics.len()], i),
            style: QuestionStyle::ALL[i % 3],
            questions: Vec::new(),
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let history = make_history(1000);

    c.bench_function("filter_sets (1000 sets, 'cell')", |b| {
        b.iter(|| filter_sets(black_box(&history), black_box("cell")))
    });

    c.bench_function("filter_sets (1000 sets, empty term)", |b| {
        b.iter(|| filter_sets(black_box(&history), black_box("")))
    });
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
