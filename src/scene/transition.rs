//! Transition effects between two scene snapshots.

use std::fmt;
use std::rc::Rc;

use glam::Vec2;

use crate::canvas::{BlendMode, Canvas, Color};
use crate::error::TransitionError;

/// Builds a fresh [`Transition`] for each scene switch.
///
/// Transitions carry their own elapsed time, so the manager never reuses an
/// instance across switches; it calls the factory every time.
pub type TransitionFactory = Rc<dyn Fn() -> Transition>;

/// Shortest duration the infallible constructors will produce.
const MIN_DURATION: f32 = 0.001;

/// The compositing effect of a transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionKind {
    /// Fade the old scene out to `color`, then fade the new scene in from it.
    Fade { color: Color },
    /// Push the old scene off to the left while the new one slides in from the right.
    Slide,
    /// Erase a growing circle from the middle of the old scene to reveal the new one.
    CircleWipe,
    /// Blend the new scene over the old one with rising opacity.
    Crossfade,
}

/// A running scene transition.
///
/// A transition is `Running` while `elapsed < duration` and `Complete` after.
/// Elapsed time only ever grows, so once complete it stays complete.
///
/// # Example
///
/// ```ignore
/// let mut fade = Transition::fade(1.0);
/// fade.advance(0.5);
/// assert_eq!(fade.fade_overlay_alpha(), 255);
/// fade.advance(0.5);
/// assert!(fade.is_complete());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    kind: TransitionKind,
    duration: f32,
    elapsed: f32,
}

impl Transition {
    /// Create a transition, rejecting non-positive or non-finite durations.
    pub fn new(kind: TransitionKind, duration: f32) -> Result<Self, TransitionError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TransitionError::InvalidDuration(duration));
        }
        Ok(Self {
            kind,
            duration,
            elapsed: 0.0,
        })
    }

    fn clamped(kind: TransitionKind, duration: f32) -> Self {
        let duration = if duration.is_finite() {
            duration.max(MIN_DURATION)
        } else {
            MIN_DURATION
        };
        Self {
            kind,
            duration,
            elapsed: 0.0,
        }
    }

    /// Fade through black over `duration` seconds (half out, half in).
    pub fn fade(duration: f32) -> Self {
        Self::fade_to_color(Color::BLACK, duration)
    }

    /// Fade through a custom color.
    pub fn fade_to_color(color: Color, duration: f32) -> Self {
        Self::clamped(TransitionKind::Fade { color }, duration)
    }

    /// Horizontal slide, new scene entering from the right.
    pub fn slide(duration: f32) -> Self {
        Self::clamped(TransitionKind::Slide, duration)
    }

    /// Circular reveal growing from the screen center.
    pub fn circle_wipe(duration: f32) -> Self {
        Self::clamped(TransitionKind::CircleWipe, duration)
    }

    /// Direct blend from old to new.
    pub fn crossfade(duration: f32) -> Self {
        Self::clamped(TransitionKind::Crossfade, duration)
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds advanced so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Normalized progress, clamped to `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// True once elapsed time has reached the duration.
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Move the transition forward by `dt` seconds.
    ///
    /// Negative and NaN deltas are ignored so elapsed time stays monotonic.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed += dt;
        }
    }

    /// Opacity of the fade overlay at the current progress.
    ///
    /// Rises 0→255 over the first half and falls 255→0 over the second.
    pub fn fade_overlay_alpha(&self) -> u8 {
        fade_alpha(self.progress()).1
    }

    /// Horizontal offsets of the old and new frames for a slide across `width`.
    pub fn slide_offsets(&self, width: f32) -> (Vec2, Vec2) {
        let shift = self.progress() * width;
        (Vec2::new(-shift, 0.0), Vec2::new(width - shift, 0.0))
    }

    /// Radius of the revealed circle for a `width` x `height` surface.
    ///
    /// Reaches the center-to-corner distance at full progress.
    pub fn wipe_radius(&self, width: f32, height: f32) -> f32 {
        let corner = Vec2::new(width / 2.0, height / 2.0).length();
        self.progress() * corner
    }

    /// Write the blended frame for the current progress into `output`.
    ///
    /// `old` and `new` hold snapshots of the outgoing and incoming scenes and
    /// must have the same size as `output`. This never changes the
    /// transition's own state.
    pub fn composite(&self, output: &mut Canvas, old: &Canvas, new: &Canvas) {
        let (width, height) = output.size();
        let (width, height) = (width as f32, height as f32);

        match self.kind {
            TransitionKind::Fade { color } => {
                let (showing_new, alpha) = fade_alpha(self.progress());
                output.copy_from(if showing_new { new } else { old });
                output.fill_rect(0.0, 0.0, width, height, color.with_alpha(alpha));
            }
            TransitionKind::Slide => {
                let (old_offset, _) = self.slide_offsets(width);
                // Derive the new frame's position from the rounded old one so
                // the two frames never leave a seam.
                let old_x = old_offset.x.round();
                output.draw_canvas(old, Vec2::new(old_x, 0.0), 1.0, BlendMode::Source);
                output.draw_canvas(new, Vec2::new(old_x + width, 0.0), 1.0, BlendMode::Source);
            }
            TransitionKind::CircleWipe => {
                output.copy_from(new);

                let mut mask = old.clone();
                mask.fill(Color::WHITE);
                mask.erase_circle(output.center(), self.wipe_radius(width, height));

                let mut reveal = old.clone();
                reveal.apply_mask(&mask);
                output.draw_canvas(&reveal, Vec2::ZERO, 1.0, BlendMode::Normal);
            }
            TransitionKind::Crossfade => {
                output.copy_from(old);
                output.draw_canvas(new, Vec2::ZERO, self.progress(), BlendMode::Normal);
            }
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Fade { .. } => write!(f, "fade"),
            TransitionKind::Slide => write!(f, "slide"),
            TransitionKind::CircleWipe => write!(f, "circle wipe"),
            TransitionKind::Crossfade => write!(f, "crossfade"),
        }
    }
}

/// Which frame a fade shows and how opaque its overlay is.
///
/// Progress 0.5 already belongs to the fade-in half.
fn fade_alpha(progress: f32) -> (bool, u8) {
    if progress < 0.5 {
        (false, ((progress / 0.5) * 255.0) as u8)
    } else {
        (true, (((1.0 - progress) / 0.5) * 255.0) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OLD: Color = Color::rgb(200, 30, 30);
    const NEW: Color = Color::rgb(30, 30, 200);
    const W: u32 = 8;
    const H: u32 = 6;

    fn frames() -> (Canvas, Canvas, Canvas) {
        let mut old = Canvas::new(W, H).unwrap();
        old.fill(OLD);
        let mut new = Canvas::new(W, H).unwrap();
        new.fill(NEW);
        (Canvas::new(W, H).unwrap(), old, new)
    }

    fn at(mut transition: Transition, progress: f32) -> Transition {
        transition.advance(transition.duration() * progress);
        transition
    }

    fn composite(transition: &Transition) -> (Canvas, Canvas, Canvas) {
        let (mut out, old, new) = frames();
        transition.composite(&mut out, &old, &new);
        (out, old, new)
    }

    #[test]
    fn invalid_durations_are_rejected() {
        for d in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(Transition::new(TransitionKind::Slide, d).is_err());
        }
        assert!(Transition::new(TransitionKind::Slide, 0.25).is_ok());
        assert!(Transition::fade(0.0).duration() > 0.0);
    }

    #[test]
    fn completion_is_monotonic() {
        let mut t = Transition::slide(1.0);
        let mut was_complete = false;
        for _ in 0..30 {
            t.advance(0.05);
            assert_eq!(t.is_complete(), t.elapsed() >= t.duration());
            assert!(t.is_complete() || !was_complete);
            was_complete = t.is_complete();
        }
        assert!(was_complete);

        t.advance(-5.0);
        t.advance(f32::NAN);
        assert!(t.is_complete());
    }

    #[test]
    fn completes_exactly_at_duration() {
        let mut t = Transition::fade(1.0);
        t.advance(0.5);
        assert!(!t.is_complete());
        t.advance(0.5);
        assert!(t.is_complete());
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn progress_is_clamped() {
        let mut t = Transition::crossfade(0.5);
        t.advance(3.0);
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn fade_overlay_alpha_shape() {
        assert_eq!(at(Transition::fade(1.0), 0.0).fade_overlay_alpha(), 0);
        assert_eq!(at(Transition::fade(1.0), 0.25).fade_overlay_alpha(), 127);
        assert_eq!(at(Transition::fade(1.0), 0.5).fade_overlay_alpha(), 255);
        assert_eq!(at(Transition::fade(1.0), 1.0).fade_overlay_alpha(), 0);
    }

    #[test]
    fn fade_is_continuous_at_midpoint() {
        let (left, left_alpha) = fade_alpha(0.4999);
        let (right, right_alpha) = fade_alpha(0.5);
        assert!(!left && right);
        assert!(left_alpha >= 254);
        assert_eq!(right_alpha, 255);
    }

    #[test]
    fn fade_endpoints_match_scenes() {
        let (out, old, _) = composite(&Transition::fade(1.0));
        assert_eq!(out.data(), old.data());

        let (out, _, new) = composite(&at(Transition::fade(1.0), 1.0));
        assert_eq!(out.data(), new.data());

        let (out, _, _) = composite(&at(Transition::fade(1.0), 0.5));
        assert_eq!(out.pixel(3, 3), Some(Color::BLACK));
    }

    #[test]
    fn fade_uses_its_color() {
        let t = at(Transition::fade_to_color(Color::WHITE, 2.0), 0.5);
        let (out, _, _) = composite(&t);
        assert_eq!(out.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn slide_offsets_at_endpoints() {
        let t = Transition::slide(1.0);
        assert_eq!(t.slide_offsets(800.0), (Vec2::ZERO, Vec2::new(800.0, 0.0)));

        let t = at(Transition::slide(1.0), 1.0);
        assert_eq!(t.slide_offsets(800.0), (Vec2::new(-800.0, 0.0), Vec2::ZERO));
    }

    #[test]
    fn slide_does_not_overshoot() {
        let mut t = Transition::slide(1.0);
        t.advance(1.7);
        assert_eq!(t.slide_offsets(100.0).1, Vec2::ZERO);
    }

    #[test]
    fn slide_composites_both_halves() {
        let (out, old, _) = composite(&Transition::slide(1.0));
        assert_eq!(out.data(), old.data());

        let (out, _, _) = composite(&at(Transition::slide(1.0), 0.5));
        assert_eq!(out.pixel(0, 2), Some(OLD));
        assert_eq!(out.pixel(3, 2), Some(OLD));
        assert_eq!(out.pixel(4, 2), Some(NEW));
        assert_eq!(out.pixel(7, 2), Some(NEW));

        let (out, _, new) = composite(&at(Transition::slide(1.0), 1.0));
        assert_eq!(out.data(), new.data());
    }

    #[test]
    fn wipe_radius_endpoints() {
        assert_eq!(Transition::circle_wipe(1.0).wipe_radius(800.0, 600.0), 0.0);
        let full = at(Transition::circle_wipe(1.0), 1.0);
        assert!(full.wipe_radius(800.0, 600.0) >= 500.0 - 1e-3);
    }

    #[test]
    fn wipe_reveals_from_the_center() {
        let (out, old, _) = composite(&Transition::circle_wipe(1.0));
        assert_eq!(out.data(), old.data());

        let (out, _, _) = composite(&at(Transition::circle_wipe(1.0), 0.5));
        assert_eq!(out.pixel(W / 2, H / 2), Some(NEW));
        assert_eq!(out.pixel(0, 0), Some(OLD));

        let (out, _, _) = composite(&at(Transition::circle_wipe(1.0), 1.0));
        assert_eq!(out.pixel(W / 2, H / 2), Some(NEW));
        assert_eq!(out.pixel(1, 1), Some(NEW));
        assert_eq!(out.pixel(W - 2, H - 2), Some(NEW));
    }

    #[test]
    fn crossfade_endpoints() {
        let (out, old, _) = composite(&Transition::crossfade(1.0));
        assert_eq!(out.data(), old.data());

        let (out, _, new) = composite(&at(Transition::crossfade(1.0), 1.0));
        assert_eq!(out.data(), new.data());
    }

    #[test]
    fn composite_does_not_advance() {
        let t = at(Transition::circle_wipe(2.0), 0.3);
        let before = t.clone();
        composite(&t);
        assert_eq!(t, before);
    }
}
