use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};

use rogue_view::core::{DeltaApplier, DirtyRegionTracker, RenderWindow, TileDataStore};
use rogue_view::raster::{Overlays, Rasterizer, RedrawScope, SpriteSheet};
use rogue_view::types::{CreatureSnapshot, Frame, Rotation, TileDeltaRect, TileLayer, ViewKind};

const S: u32 = 32;
const VIEW_W: u32 = 26;
const VIEW_H: u32 = 24;

fn full_frame(seq: u64) -> Frame {
    let cells = (0..VIEW_W * VIEW_H)
        .map(|i| {
            vec![
                TileLayer::new(i % 4, Rotation::Deg0),
                TileLayer::new(4 + i % 3, Rotation::from_degrees(90 * (i as i64 % 4)).unwrap_or_default()),
            ]
        })
        .collect();
    Frame {
        seq,
        view_x: 100,
        view_y: 200,
        view_width: VIEW_W,
        view_height: VIEW_H,
        deltas: vec![TileDeltaRect {
            x: 0,
            y: 0,
            width: VIEW_W,
            height: VIEW_H,
            cells,
        }],
        creatures: (0..20)
            .map(|i| CreatureSnapshot {
                x: 100 + i,
                y: 200 + i,
                hp: i as i64,
                max_hp: 20,
                username: Some(format!("agent{i}")),
            })
            .collect(),
        full_redraw: true,
        game_ticks: None,
    }
}

fn sheet() -> SpriteSheet {
    let mut sheet = SpriteSheet::new(S);
    for id in 0..7u32 {
        let shade = (id * 30) as u8;
        sheet.insert(id, RgbaImage::from_pixel(S, S, Rgba([shade, 255 - shade, 64, 255])));
    }
    sheet
}

fn bench_delta_apply(c: &mut Criterion) {
    let frame = full_frame(1);
    let window = RenderWindow::for_frame(ViewKind::World, &frame, 1024, 768, S);
    let mut store = TileDataStore::new();
    let mut applier = DeltaApplier::new(S);

    c.bench_function("delta_apply_full_view", |b| {
        b.iter(|| {
            let mut dirty = DirtyRegionTracker::for_sprite_size(S);
            applier.apply(black_box(&frame), &window, &mut store, &mut dirty);
            black_box(dirty.dirty_cell_count())
        })
    });
}

fn bench_world_raster(c: &mut Criterion) {
    let frame = full_frame(1);
    let window = RenderWindow::for_frame(ViewKind::World, &frame, 1024, 768, S);
    let mut store = TileDataStore::new();
    let mut dirty = DirtyRegionTracker::for_sprite_size(S);
    DeltaApplier::new(S).apply(&frame, &window, &mut store, &mut dirty);

    let mut rasterizer = Rasterizer::new(ViewKind::World, 1024, 768, S).with_sprites(sheet());
    let overlays = Overlays {
        creatures: &frame.creatures,
        frame_seq: frame.seq,
        ..Overlays::default()
    };

    c.bench_function("world_raster_full", |b| {
        b.iter(|| {
            rasterizer.draw_frame(&window, &store, RedrawScope::All, &overlays)
        })
    });

    let mut partial = DirtyRegionTracker::for_sprite_size(S);
    partial.flag_rect(0, 0, 4 * S, 4 * S);
    c.bench_function("world_raster_dirty", |b| {
        b.iter(|| {
            rasterizer.draw_frame(&window, &store, RedrawScope::Dirty(&partial), &overlays)
        })
    });
}

criterion_group!(benches, bench_delta_apply, bench_world_raster);
criterion_main!(benches);
