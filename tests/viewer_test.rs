use image::{Rgba, RgbaImage};

use rogue_view::net::{parse_message, Inbound};
use rogue_view::raster::rasterizer::PLAY_AREA;
use rogue_view::raster::SpriteSheet;
use rogue_view::types::{Frame, Rotation, TileDeltaRect, TileLayer, TileRect, ViewKind};
use rogue_view::viewer::{IngestOutcome, TickOutcome, ViewerConfig, ViewerContext};

const S: u32 = 4;
const RED: Rgba<u8> = Rgba([200, 0, 0, 255]);

fn config(view: ViewKind) -> ViewerConfig {
    ViewerConfig {
        view,
        sprite_size: S,
        surface_width: 400,
        surface_height: 64,
        ..ViewerConfig::default()
    }
}

fn sprites() -> SpriteSheet {
    let mut sheet = SpriteSheet::new(S);
    sheet.insert(2, RgbaImage::from_pixel(S, S, RED));
    sheet
}

fn empty_frame(seq: u64) -> Frame {
    Frame {
        seq,
        view_x: 0,
        view_y: 0,
        view_width: 16,
        view_height: 16,
        deltas: Vec::new(),
        creatures: Vec::new(),
        full_redraw: false,
        game_ticks: None,
    }
}

fn red_tile_at(mut frame: Frame, x: i32, y: i32) -> Frame {
    frame.deltas.push(TileDeltaRect {
        x,
        y,
        width: 1,
        height: 1,
        cells: vec![vec![TileLayer::new(2, Rotation::Deg0)]],
    });
    frame
}

fn ingest_frame(ctx: &mut ViewerContext, frame: Frame) {
    assert_eq!(ctx.ingest(Inbound::Frame(frame)), IngestOutcome::Accepted);
}

#[test]
fn out_of_order_frames_are_drawn_in_sequence() {
    let mut ctx = ViewerContext::new(&config(ViewKind::World), sprites());
    ingest_frame(&mut ctx, empty_frame(1));
    assert!(matches!(ctx.tick(0), TickOutcome::FrameDrawn { seq: 1, .. }));

    for seq in [4, 2, 3] {
        ingest_frame(&mut ctx, empty_frame(seq));
    }
    let mut drawn = Vec::new();
    let mut now = 0;
    while ctx.pending_frames() > 0 {
        now += 1000;
        if let TickOutcome::FrameDrawn { seq, .. } = ctx.tick(now) {
            drawn.push(seq);
        }
    }
    assert_eq!(drawn, vec![2, 3, 4]);
}

#[test]
fn world_view_shows_delta_tiles() {
    let mut ctx = ViewerContext::new(&config(ViewKind::World), sprites());
    ingest_frame(&mut ctx, red_tile_at(empty_frame(1), 2, 3));
    assert!(matches!(ctx.tick(0), TickOutcome::FrameDrawn { seq: 1, .. }));

    assert_eq!(ctx.surface().pixel(2 * S + 1, 3 * S + 1), Some(RED));
    assert_eq!(ctx.surface().pixel(1, 1), Some(PLAY_AREA));
    assert_eq!(ctx.store().base_image(2, 3), Some(2));
}

#[test]
fn catch_up_skips_raster_but_keeps_dirty_marks() {
    let mut ctx = ViewerContext::new(&config(ViewKind::World), sprites());
    let mut first = empty_frame(1);
    first.full_redraw = true;
    ingest_frame(&mut ctx, first);
    assert!(matches!(ctx.tick(0), TickOutcome::FrameDrawn { seq: 1, .. }));

    ingest_frame(&mut ctx, red_tile_at(empty_frame(2), 0, 0));
    for seq in 3..=13 {
        ingest_frame(&mut ctx, empty_frame(seq));
    }

    // Backlog 12 and 11 are over the threshold; 10 is not.
    assert_eq!(ctx.tick(1000), TickOutcome::FrameSkipped { seq: 2 });
    assert_eq!(ctx.tick(2000), TickOutcome::FrameSkipped { seq: 3 });
    assert_eq!(ctx.surface().pixel(1, 1), Some(PLAY_AREA));

    match ctx.tick(3000) {
        TickOutcome::FrameDrawn { seq, cells_redrawn } => {
            assert_eq!(seq, 4);
            assert!(cells_redrawn > 0);
        }
        other => panic!("expected a drawn frame, got {other:?}"),
    }
    assert_eq!(ctx.surface().pixel(1, 1), Some(RED));
    assert_eq!(ctx.stats().frames_skipped, 2);
}

#[test]
fn full_redraw_frames_are_never_skipped() {
    let mut ctx = ViewerContext::new(&config(ViewKind::World), sprites());
    ingest_frame(&mut ctx, empty_frame(1));
    ctx.tick(0);

    let mut full = empty_frame(2);
    full.full_redraw = true;
    ingest_frame(&mut ctx, full);
    for seq in 3..=14 {
        ingest_frame(&mut ctx, empty_frame(seq));
    }
    // Same origin and no deltas leave the tracker clean; every visible cell
    // is still repainted.
    assert_eq!(
        ctx.tick(1000),
        TickOutcome::FrameDrawn {
            seq: 2,
            cells_redrawn: 16 * 16
        }
    );
    assert_eq!(ctx.tick(2000), TickOutcome::FrameSkipped { seq: 3 });
}

#[test]
fn follow_view_glides_between_snapshots() {
    let cfg = ViewerConfig {
        surface_width: 64,
        ..config(ViewKind::Follow)
    };
    let mut ctx = ViewerContext::new(&cfg, sprites());

    ingest_frame(&mut ctx, empty_frame(1));
    assert!(matches!(ctx.tick(0), TickOutcome::FrameDrawn { seq: 1, .. }));
    assert_eq!(ctx.tick(1), TickOutcome::CameraStep { remaining: 0 });

    // 80 tiles down at 4 px per tile is the 320 px clamp: five steps.
    let mut moved = empty_frame(2);
    moved.view_y = 80;
    ingest_frame(&mut ctx, moved);
    assert!(matches!(ctx.tick(2), TickOutcome::FrameDrawn { seq: 2, .. }));
    assert_eq!(ctx.pending_steps(), 5);

    assert_eq!(ctx.tick(3), TickOutcome::CameraStep { remaining: 4 });
    // Steps are 20 ms apart with an empty backlog.
    assert_eq!(ctx.tick(10), TickOutcome::Idle);
    let mut now = 3;
    for remaining in (0..4).rev() {
        now += 20;
        assert_eq!(ctx.tick(now), TickOutcome::CameraStep { remaining });
    }
    assert_eq!(ctx.pending_steps(), 0);
}

/// Topmost surface row of the red tile in column `x`.
fn red_top(ctx: &ViewerContext, x: u32) -> Option<u32> {
    (0..ctx.surface().height()).find(|&y| ctx.surface().pixel(x, y) == Some(RED))
}

#[test]
fn follow_view_glide_moves_evenly() {
    let cfg = ViewerConfig {
        surface_width: 64,
        ..config(ViewKind::Follow)
    };
    let mut ctx = ViewerContext::new(&cfg, sprites());

    // Red tile at world (8, 12), camera at the origin.
    ingest_frame(&mut ctx, red_tile_at(empty_frame(1), 8, 12));
    ctx.tick(0);
    assert_eq!(ctx.tick(1), TickOutcome::CameraStep { remaining: 0 });
    assert_eq!(red_top(&ctx, 33), Some(48));

    // Ten tiles down is 40px: twelve steps of 3 or 4 px each.
    let mut moved = empty_frame(2);
    moved.view_y = 10;
    ingest_frame(&mut ctx, moved);
    assert!(matches!(ctx.tick(2), TickOutcome::FrameDrawn { seq: 2, .. }));
    assert_eq!(ctx.pending_steps(), 12);

    let mut now = 2;
    let mut last = 48;
    while ctx.pending_steps() > 0 {
        assert!(matches!(ctx.tick(now), TickOutcome::CameraStep { .. }));
        now += 20;
        let top = red_top(&ctx, 33).expect("red tile left the surface") as i32;
        assert!((3..=4).contains(&(last - top)), "jumped from {last} to {top}");
        last = top;
    }
    assert_eq!(last, 8);
}

#[test]
fn floating_damage_waits_for_its_frame_and_expires() {
    let mut ctx = ViewerContext::new(&config(ViewKind::World), sprites());
    let ui = parse_message(
        r#"{"type":"JsonUpdateBrowserUI","combatEvents":[{"x":2,"y":2,"frame":3,"damage":7}],"currentPlayerScore":12}"#,
    )
    .unwrap();
    assert_eq!(ctx.ingest(ui), IngestOutcome::Accepted);
    assert_eq!(ctx.ui().player_score, Some(12));

    let has_damage_label = |ctx: &ViewerContext| ctx.surface().labels().iter().any(|l| l.text == "7");

    let mut now = 0;
    for seq in 1..=2 {
        ingest_frame(&mut ctx, empty_frame(seq));
        ctx.tick(now);
        now += 1000;
        assert!(!has_damage_label(&ctx), "drawn before frame 3");
    }

    ingest_frame(&mut ctx, empty_frame(3));
    ctx.tick(now);
    assert!(has_damage_label(&ctx));

    // Drawn on frames 3..=12, then gone.
    for seq in 4..=11 {
        now += 1000;
        ingest_frame(&mut ctx, empty_frame(seq));
        ctx.tick(now);
    }
    assert_eq!(ctx.floating().live().len(), 1);
    now += 1000;
    ingest_frame(&mut ctx, empty_frame(12));
    ctx.tick(now);
    assert!(ctx.floating().live().is_empty());
}

#[test]
fn oversized_delta_rect_stays_within_the_view() {
    let mut ctx = ViewerContext::new(&config(ViewKind::World), sprites());
    let mut frame = empty_frame(1);
    frame.deltas.push(TileDeltaRect {
        x: 0,
        y: 0,
        width: 200_000_000,
        height: 20_000,
        cells: vec![vec![TileLayer::new(2, Rotation::Deg0)]],
    });
    ingest_frame(&mut ctx, frame);
    match ctx.tick(0) {
        TickOutcome::FrameDrawn { cells_redrawn, .. } => assert!(cells_redrawn <= 16 * 16),
        other => panic!("expected a drawn frame, got {other:?}"),
    }
    assert_eq!(ctx.store().len(), 1);

    // The same rect never reaches the pipeline from the wire.
    let wire = r#"{"frame":2,"currWorldPosX":0,"currWorldPosY":0,"currViewWidth":16,"currViewHeight":16,
        "frameData":[{"x":0,"y":0,"w":20000,"h":20000,"data":[[[2]]]}]}"#;
    assert!(parse_message(wire).is_err());
}

#[test]
fn reset_starts_a_clean_session() {
    let mut ctx = ViewerContext::new(&config(ViewKind::World), sprites());
    ingest_frame(&mut ctx, red_tile_at(empty_frame(50), 0, 0));
    ctx.tick(0);
    ctx.ingest(parse_message(r#"{"type":"JsonUpdateBrowserUI","currentPlayerRank":3}"#).unwrap());

    ctx.reset();
    assert!(ctx.store().is_empty());
    assert_eq!(ctx.ui().player_rank, Some(3));

    ingest_frame(&mut ctx, empty_frame(1));
    assert!(matches!(ctx.tick(0), TickOutcome::FrameDrawn { seq: 1, .. }));
    assert_eq!(ctx.surface().pixel(1, 1), Some(PLAY_AREA));
}

#[test]
fn world_view_outlines_the_followed_agent() {
    let cfg = ViewerConfig {
        follow_box: Some(TileRect {
            x: 4,
            y: 4,
            width: 4,
            height: 4,
        }),
        ..config(ViewKind::World)
    };
    let mut ctx = ViewerContext::new(&cfg, sprites());
    ingest_frame(&mut ctx, empty_frame(1));
    ctx.tick(0);

    // Outline starts three pixels up and left of the box.
    assert_ne!(ctx.surface().pixel(4 * S - 3, 4 * S - 3), Some(PLAY_AREA));
    assert_eq!(ctx.surface().pixel(6 * S, 6 * S), Some(PLAY_AREA));
}
