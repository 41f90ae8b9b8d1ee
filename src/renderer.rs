/*
 * Renderer Module
 *
 * This module draws the simulation: the world rectangle, optional grid
 * lines, and every birb as an arrow rotated to its heading. It only sees
 * birbs through RenderBirb copies and the grid through its dimensions.
 */

use log::error;
use nannou::color::{Rgb, Rgba};
use nannou::prelude::*;

use crate::app::Model;
use crate::BIRB_SIZE;

// Arrow sprite in birb-size units, pointing along +x
const BIRB_SHAPE: [(f32, f32); 4] = [(1.0, 0.0), (-1.0, -1.0), (-0.5, 0.0), (-1.0, 1.0)];

pub fn hex_color(hex: u32) -> Rgb<u8> {
    rgb(
        ((hex >> 16) & 0xff) as u8,
        ((hex >> 8) & 0xff) as u8,
        (hex & 0xff) as u8,
    )
}

fn hex_rgba(hex: u32, alpha: f32) -> Rgba {
    let color = hex_color(hex);
    rgba(
        color.red as f32 / 255.0,
        color.green as f32 / 255.0,
        color.blue as f32 / 255.0,
        alpha,
    )
}

pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();
    let camera = &model.camera;
    let config = model.simulation.config();
    let palette = config.palette;

    draw.background().color(hex_color(palette.background_color));

    // World rectangle
    let world_min = camera.world_to_screen(vec2(0.0, 0.0), window_rect);
    let world_max = camera.world_to_screen(vec2(config.world_width, config.world_height), window_rect);
    let world_rect = Rect::from_corners(world_min, world_max);
    draw.rect()
        .xy(world_rect.xy())
        .wh(world_rect.wh())
        .color(hex_color(palette.world_color));

    if model.controls.show_grid {
        draw_grid_lines(&draw, model, window_rect);
    }

    // Only draw birbs that land near the window
    let margin = BIRB_SIZE * camera.zoom;
    let visible = Rect::from_xy_wh(
        window_rect.xy(),
        vec2(window_rect.w() + margin * 2.0, window_rect.h() + margin * 2.0),
    );
    let scaled_size = BIRB_SIZE * camera.zoom;
    let points: Vec<Point2> = BIRB_SHAPE
        .iter()
        .map(|&(x, y)| pt2(x * scaled_size, y * scaled_size))
        .collect();
    let birb_color = hex_color(palette.birb_color);

    for birb in model.simulation.render_view() {
        let screen_pos = camera.world_to_screen(vec2(birb.x, birb.y), window_rect);
        if !visible.contains(screen_pos) {
            continue;
        }
        draw.polygon()
            .color(birb_color)
            .points(points.iter().cloned())
            .xy(screen_pos)
            .rotate(birb.rotation);
    }

    // Highlight the followed birb and its perception radius
    if let Some((x, y)) = camera.following.and_then(|id| model.simulation.follow(id)) {
        let screen_pos = camera.world_to_screen(vec2(x, y), window_rect);
        draw.ellipse()
            .xy(screen_pos)
            .radius(config.visual_distance * camera.zoom)
            .no_fill()
            .stroke(GREEN)
            .stroke_weight(1.0);
        draw.ellipse()
            .xy(screen_pos)
            .radius(config.min_distance * camera.zoom)
            .no_fill()
            .stroke(RED)
            .stroke_weight(1.0);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        error!("failed to draw frame: {err:?}");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        error!("failed to draw ui: {err:?}");
    }
}

fn draw_grid_lines(draw: &Draw, model: &Model, window_rect: Rect) {
    let camera = &model.camera;
    let config = model.simulation.config();
    let grid = model.simulation.grid();
    let color = hex_rgba(config.palette.grid_color, 0.15);
    let (width, height) = (config.world_width, config.world_height);

    // The last row and column may be cut short by the world edge
    for col in 0..=grid.cols() {
        let x = (col as f32 * grid.cell_size()).min(width);
        draw.line()
            .start(camera.world_to_screen(vec2(x, 0.0), window_rect))
            .end(camera.world_to_screen(vec2(x, height), window_rect))
            .weight(1.0)
            .color(color);
    }
    for row in 0..=grid.rows() {
        let y = (row as f32 * grid.cell_size()).min(height);
        draw.line()
            .start(camera.world_to_screen(vec2(0.0, y), window_rect))
            .end(camera.world_to_screen(vec2(width, y), window_rect))
            .weight(1.0)
            .color(color);
    }
}
