/*
 * Input Module
 *
 * This module handles user input events for the viewer.
 *
 * Features:
 * - Camera panning with mouse drag
 * - Camera zooming with mouse wheel
 * - Clicking a birb to follow it
 * - Keyboard toggles for pause, search mode and grid lines
 */

use log::debug;
use nannou::prelude::*;
use nannou::winit::event::{MouseButton, MouseScrollDelta, TouchPhase};

use crate::app::Model;
use crate::BIRB_SIZE;

pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    let new_pos = Vec2::new(pos.x, pos.y);
    if model.camera.is_dragging {
        model.camera.drag(new_pos);
    }
    model.mouse_position = new_pos;
}

pub fn mouse_pressed(app: &App, model: &mut Model, button: MouseButton) {
    if button != MouseButton::Left || model.egui.ctx().is_pointer_over_area() {
        return;
    }

    let window_rect = app.window_rect();
    let world_pos = model.camera.screen_to_world(model.mouse_position, window_rect);

    // Generous pick radius so small birbs stay clickable when zoomed out
    let pick_radius = (BIRB_SIZE * 2.0 / model.camera.zoom).min(model.simulation.grid().cell_size());
    match model.simulation.birb_near(world_pos.x, world_pos.y, pick_radius) {
        Some(id) => {
            debug!("following birb {id}");
            model.camera.follow(id);
        }
        None => model.camera.start_drag(model.mouse_position),
    }
}

pub fn mouse_released(_app: &App, model: &mut Model, button: MouseButton) {
    if button == MouseButton::Left {
        model.camera.end_drag();
    }
}

pub fn mouse_wheel(app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    let scroll_y = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
    };
    model.camera.zoom(scroll_y, model.mouse_position, app.window_rect());
}

pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    let controls = &mut model.controls;
    match key {
        Key::P => {
            controls.paused = !controls.paused;
            debug!("paused: {}", controls.paused);
        }
        Key::G => {
            controls.search = controls.search.toggled();
            debug!("neighbor search: {}", controls.search.label());
        }
        Key::L => controls.show_grid = !controls.show_grid,
        Key::R => model.camera.reset(),
        Key::Escape => {
            if model.camera.following.take().is_some() {
                debug!("stopped following");
            }
        }
        _ => {}
    }
}

// Pass raw window events to egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
