//! Scenario tests for the session: images in, events in, frames and overlays out.


use image::{DynamicImage, Rgb, RgbImage};
use pglabel_raster::Point;
use web_time::Instant;

use super::Session;
use crate::event::{InputEvent, Key, Modifiers, PointerButton};

/// Uniform test image.
fn solid(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([value; 3])))
}

/// Session with a uniform `width`x`height` foreground on the default surface.
fn loaded(width: u32, height: u32) -> Session {
    let mut session = Session::default();
    session.load_foreground(solid(width, height, 128)).unwrap();
    session
}

fn send(session: &mut Session, event: InputEvent) -> bool {
    session.handle_event(event, Instant::now())
}

fn press_with(x: f32, y: f32, modifiers: Modifiers) -> InputEvent {
    InputEvent::PointerPressed {
        button: PointerButton::Left,
        position: Point::new(x, y),
        modifiers,
    }
}

fn press(x: f32, y: f32) -> InputEvent {
    press_with(x, y, Modifiers::NONE)
}

fn release_with(x: f32, y: f32, modifiers: Modifiers) -> InputEvent {
    InputEvent::PointerReleased {
        button: PointerButton::Left,
        position: Point::new(x, y),
        modifiers,
    }
}

fn release(x: f32, y: f32) -> InputEvent {
    release_with(x, y, Modifiers::NONE)
}

fn move_to(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMoved {
        position: Point::new(x, y),
        modifiers: Modifiers::NONE,
    }
}

fn key(key: Key) -> InputEvent {
    InputEvent::KeyPressed {
        key,
        modifiers: Modifiers::NONE,
    }
}
