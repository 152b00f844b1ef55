//! Triangle-list generation for the parade ground
//!
//! Everything is emitted in canvas pixels (y down); `RenderState` maps to NDC.

use glam::{DVec2, Vec2};
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::sim::{Bounds, Joystick, RenderFrame};

const CIRCLE_SEGMENTS: u32 = 24;
/// Yard lines drawn across the field
const FIELD_LINES: u32 = 8;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    ellipse(center, Vec2::splat(radius), color, segments)
}

/// Filled axis-aligned ellipse
pub fn ellipse(center: Vec2, radii: Vec2, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radii.x * theta1.cos(),
            center.y + radii.y * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radii.x * theta2.cos(),
            center.y + radii.y * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let dir1 = Vec2::new(theta1.cos(), theta1.sin());
        let dir2 = Vec2::new(theta2.cos(), theta2.sin());

        let inner1 = center + dir1 * inner_radius;
        let outer1 = center + dir1 * outer_radius;
        let inner2 = center + dir2 * inner_radius;
        let outer2 = center + dir2 * outer_radius;

        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Axis-aligned rectangle from two corners
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Grass and yard lines
pub fn field(bounds: &Bounds) -> Vec<Vertex> {
    let min = Vec2::new(bounds.left as f32, bounds.top as f32);
    let max = Vec2::new(bounds.right as f32, bounds.bottom as f32);
    let mut vertices = rect(min, max, colors::FIELD);

    let step = (max.y - min.y) / FIELD_LINES as f32;
    for i in 1..FIELD_LINES {
        let y = min.y + step * i as f32;
        vertices.extend(rect(
            Vec2::new(min.x, y - 0.75),
            Vec2::new(max.x, y + 0.75),
            colors::FIELD_LINE,
        ));
    }
    vertices
}

/// A musician standing at `origin` with feet at `feet`
pub fn musician(origin: Vec2, feet: Vec2, scale: f32, uniform: [f32; 4], plume: [f32; 4]) -> Vec<Vertex> {
    let mut v = ellipse(feet, Vec2::new(8.0, 3.0) * scale, colors::SHADOW, 12);
    // Body down to the feet
    v.extend(rect(
        Vec2::new(origin.x - 5.0 * scale, origin.y - 2.0 * scale),
        Vec2::new(origin.x + 5.0 * scale, feet.y),
        uniform,
    ));
    v.extend(circle(origin - Vec2::new(0.0, 6.0 * scale), 4.5 * scale, colors::SKIN, 12));
    // Shako with plume
    v.extend(rect(
        Vec2::new(origin.x - 3.5 * scale, origin.y - 16.0 * scale),
        Vec2::new(origin.x + 3.5 * scale, origin.y - 9.5 * scale),
        uniform,
    ));
    v.extend(rect(
        Vec2::new(origin.x - 1.2 * scale, origin.y - 20.0 * scale),
        Vec2::new(origin.x + 1.2 * scale, origin.y - 15.0 * scale),
        plume,
    ));
    v
}

fn zone_color(frame: &RenderFrame) -> [f32; 4] {
    if frame.in_grace {
        colors::ZONE_GRACE
    } else if frame.in_zone {
        colors::ZONE_OK
    } else {
        colors::ZONE_OUT
    }
}

/// Full scene for one frame: field, zone, then musicians back to front
pub fn frame_vertices(frame: &RenderFrame, bounds: &Bounds) -> Vec<Vertex> {
    let mut vertices = field(bounds);

    let zone = frame.zone_center.as_vec2();
    let r = frame.zone_radius as f32;
    vertices.extend(circle(zone, r, zone_color(frame), CIRCLE_SEGMENTS));
    vertices.extend(ring(zone, r - 1.5, r, colors::ZONE_RING, CIRCLE_SEGMENTS));

    // Sort by feet so nearer musicians overlap farther ones
    let mut sprites: Vec<(DVec2, DVec2, bool)> = frame
        .npcs_with_feet()
        .map(|(origin, feet)| (origin, feet, false))
        .collect();
    sprites.push((frame.player, frame.player_feet, true));
    sprites.sort_by(|a, b| a.1.y.total_cmp(&b.1.y));

    for (origin, feet, is_player) in sprites {
        vertices.extend(if is_player {
            musician(
                origin.as_vec2(),
                feet.as_vec2(),
                frame.player_scale as f32,
                colors::PLAYER_UNIFORM,
                colors::PLAYER_PLUME,
            )
        } else {
            musician(
                origin.as_vec2(),
                feet.as_vec2(),
                frame.npc_scale as f32,
                colors::NPC_UNIFORM,
                colors::NPC_PLUME,
            )
        });
    }
    vertices
}

/// Thumbstick overlay with the knob at `knob`
pub fn joystick(stick: &Joystick, knob: DVec2) -> Vec<Vertex> {
    let center = stick.center.as_vec2();
    let r = stick.radius as f32;
    let mut vertices = circle(center, r, colors::STICK_BASE, CIRCLE_SEGMENTS);
    vertices.extend(ring(center, r - 2.0, r, colors::STICK_RING, CIRCLE_SEGMENTS));
    vertices.extend(circle(knob.as_vec2(), r * 0.42, colors::STICK_KNOB, CIRCLE_SEGMENTS));
    vertices
}
