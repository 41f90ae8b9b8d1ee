/*
 * Camera Module
 *
 * This module defines the Camera struct that handles zooming, panning and
 * following a single birb. It provides coordinate transformations between
 * world space and screen space.
 */

use nannou::prelude::*;

use crate::config::CameraConfig;

pub struct Camera {
    // World point shown at the window center
    pub position: Vec2,
    pub zoom: f32,
    pub zoom_factor: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub is_dragging: bool,
    pub last_cursor_pos: Vec2,
    // Birb id the camera is locked onto
    pub following: Option<usize>,
    home: Vec2,
}

impl Camera {
    pub fn new(config: &CameraConfig, home: Vec2) -> Self {
        Self {
            position: home,
            zoom: 1.0f32.clamp(config.min_zoom, config.max_zoom),
            zoom_factor: config.zoom_factor,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            is_dragging: false,
            last_cursor_pos: Vec2::ZERO,
            following: None,
            home,
        }
    }

    // Convert a point from world space to screen space
    pub fn world_to_screen(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - self.position) * self.zoom + window_rect.xy()
    }

    // Convert a point from screen space to world space
    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - window_rect.xy()) / self.zoom + self.position
    }

    // Zoom one step in or out, keeping the world point under the cursor fixed
    pub fn zoom(&mut self, scroll_y: f32, cursor_position: Vec2, window_rect: Rect) {
        if scroll_y == 0.0 {
            return;
        }
        let factor = if scroll_y > 0.0 {
            self.zoom_factor
        } else {
            1.0 / self.zoom_factor
        };

        let cursor_world_before = self.screen_to_world(cursor_position, window_rect);
        self.zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        let cursor_world_after = self.screen_to_world(cursor_position, window_rect);

        // While following, the tracked birb stays centered instead
        if self.following.is_none() {
            self.position += cursor_world_before - cursor_world_after;
        }
    }

    pub fn start_drag(&mut self, position: Vec2) {
        self.last_cursor_pos = position;
        self.is_dragging = true;
        self.following = None;
    }

    pub fn drag(&mut self, position: Vec2) {
        if self.is_dragging {
            let delta = position - self.last_cursor_pos;
            if delta.length_squared() > 0.0 {
                self.position -= delta / self.zoom;
                self.last_cursor_pos = position;
            }
        }
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }

    pub fn follow(&mut self, id: usize) {
        self.following = Some(id);
        self.is_dragging = false;
    }

    // Center on the followed birb's current position
    pub fn track(&mut self, target: Option<(f32, f32)>) {
        match target {
            Some((x, y)) => self.position = vec2(x, y),
            None => self.following = None,
        }
    }

    pub fn reset(&mut self) {
        self.position = self.home;
        self.zoom = 1.0f32.clamp(self.min_zoom, self.max_zoom);
        self.following = None;
        self.is_dragging = false;
    }
}
