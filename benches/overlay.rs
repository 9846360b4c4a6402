// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-RaccoonInspect-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Raccoon Inspect and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use raccoon_inspect::channel::MemoryTransport;
use raccoon_inspect::config::InspectConfig;
use raccoon_inspect::controller::Controller;
use raccoon_inspect::dom::{ClickInput, HostEvent, MemoryDocument, Modifiers, SourceFixture};
use raccoon_inspect::model::{Point, Rect, Viewport};

const COLUMNS: usize = 12;
const CELL: f64 = 80.0;

/// A grid where every column is rendered by the same source location.
fn grid(rows: usize) -> MemoryDocument {
    let mut doc = MemoryDocument::new(Viewport::new(COLUMNS as f64 * CELL, 800.0));
    let body = doc.body();
    for row in 0..rows {
        for column in 0..COLUMNS {
            let source = SourceFixture::new("Cell", "src/grid.tsx", 10 + column as u32, 4);
            let layout = Rect::new(column as f64 * CELL, row as f64 * CELL, CELL, CELL);
            let cell = doc.append_tagged(body, "div", layout, &source);
            doc.append(cell, "span", Rect::new(layout.x + 8.0, layout.y + 8.0, 40.0, 16.0));
        }
    }
    doc
}

fn armed(rows: usize) -> Controller<MemoryDocument, MemoryTransport> {
    let mut controller =
        Controller::install(grid(rows), MemoryTransport::new(), InspectConfig::default())
            .expect("install");
    controller.activate();
    controller
}

// Benchmark identity (keep stable):
// - Group names: `overlay.hover`, `overlay.reposition`
// - Case IDs are the grid row counts.
fn benches_overlay(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay.hover");
    for rows in [8, 64] {
        let mut controller = armed(rows);
        let points: Vec<Point> = (0..COLUMNS)
            .map(|column| Point::new(column as f64 * CELL + 20.0, 20.0 + (column % 4) as f64 * CELL))
            .collect();
        group.bench_function(format!("rows_{rows}"), |b| {
            b.iter(|| {
                for point in &points {
                    controller.handle(HostEvent::PointerMove(black_box(*point)));
                }
                black_box(controller.highlights().hover_marker_count())
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("overlay.reposition");
    for rows in [8, 64] {
        let mut controller = armed(rows);
        for column in 0..COLUMNS {
            let point = Point::new(column as f64 * CELL + 20.0, 20.0);
            controller.handle(HostEvent::Click(ClickInput { point, modifiers: Modifiers::SHIFT }));
        }
        let mut scroll = 0.0;
        group.bench_function(format!("rows_{rows}"), |b| {
            b.iter(|| {
                scroll = if scroll == 0.0 { CELL } else { 0.0 };
                controller.document_mut().scroll_to(0.0, scroll);
                controller.handle(HostEvent::Scroll);
                controller.document_mut().take_frame_requests();
                controller.handle(HostEvent::AnimationFrame);
                black_box(controller.highlights().marker_count())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benches_overlay);
criterion_main!(benches);
