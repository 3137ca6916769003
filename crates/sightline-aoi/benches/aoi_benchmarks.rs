use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sightline_aoi::*;

struct Pawn {
    guid: EntityGuid,
    position: DVec2,
    vision: f64,
}

impl VisionEntity for Pawn {
    fn guid(&self) -> EntityGuid {
        self.guid
    }

    fn position(&self) -> DVec2 {
        self.position
    }

    fn vision(&self) -> f64 {
        self.vision
    }
}

/// Deterministic scatter over a 1000x1000 plane.
fn pawns(count: i64) -> Vec<Arc<Pawn>> {
    (0..count)
        .map(|id| {
            let x = (id * 7919 % 1000) as f64;
            let y = (id * 104_729 % 1000) as f64;
            Arc::new(Pawn {
                guid: EntityGuid::new(id),
                position: DVec2::new(x, y),
                vision: 60.0,
            })
        })
        .collect()
}

fn populated(count: i64) -> (SpatialIndex<Arc<Pawn>>, Vec<Arc<Pawn>>) {
    let index: SpatialIndex<Arc<Pawn>> = SpatialIndex::new(AoiSettings::default()).unwrap();
    let pawns = pawns(count);
    for pawn in &pawns {
        index.add_entity(pawn.clone());
    }
    (index, pawns)
}

fn bench_add_1000(c: &mut Criterion) {
    let pawns = pawns(1000);
    c.bench_function("aoi_add_1000", |bencher| {
        bencher.iter(|| {
            let index: SpatialIndex<Arc<Pawn>> = SpatialIndex::new(AoiSettings::default()).unwrap();
            for pawn in &pawns {
                index.add_entity(pawn.clone());
            }
            black_box(index.len())
        })
    });
}

fn bench_refresh_all(c: &mut Criterion) {
    let (index, pawns) = populated(1000);
    c.bench_function("aoi_refresh_1000", |bencher| {
        bencher.iter(|| {
            for pawn in &pawns {
                index.refresh(pawn);
            }
        })
    });
}

fn bench_get_focus(c: &mut Criterion) {
    let (index, _) = populated(1000);
    let guid = black_box(EntityGuid::new(500));
    c.bench_function("aoi_get_focus", |bencher| {
        bencher.iter(|| black_box(index.get_focus(guid)))
    });
}

fn bench_cell_resize(c: &mut Criterion) {
    let (index, _) = populated(500);
    let mut flip = false;
    c.bench_function("aoi_set_area_size_500", |bencher| {
        bencher.iter(|| {
            flip = !flip;
            let size = if flip { 50.0 } else { 100.0 };
            index.set_area_size(size, size).unwrap();
        })
    });
}

criterion_group!(
    benches,
    bench_add_1000,
    bench_refresh_all,
    bench_get_focus,
    bench_cell_resize
);
criterion_main!(benches);
