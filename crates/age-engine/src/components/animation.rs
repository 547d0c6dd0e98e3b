//! Frame-cycling animation for entity shapes.
//!
//! Frames last a whole number of ticks. A looping animation wraps back to
//! frame 0; a one-shot animation freezes on its last frame and reports
//! itself finished.

use glam::IVec2;
use crate::assets::registry::ShapeHandle;

/// A single animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Shape shown while this frame is current.
    pub shape: ShapeHandle,
    /// Ticks the frame stays current. Zero behaves like one.
    pub duration_ticks: u32,
    /// Draw offset relative to the entity position.
    pub offset: IVec2,
}

impl Frame {
    pub fn new(shape: ShapeHandle, duration_ticks: u32) -> Self {
        Self {
            shape,
            duration_ticks,
            offset: IVec2::ZERO,
        }
    }

    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset = IVec2::new(x, y);
        self
    }
}

/// Animation state for an entity.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<Frame>,
    current_index: usize,
    tick_counter: u32,
    looping: bool,
    finished: bool,
}

impl Animation {
    pub fn new(frames: Vec<Frame>, looping: bool) -> Self {
        Self {
            frames,
            current_index: 0,
            tick_counter: 0,
            looping,
            finished: false,
        }
    }

    /// Create a looping animation.
    pub fn looping(frames: Vec<Frame>) -> Self {
        Self::new(frames, true)
    }

    /// Create an animation that plays once and holds its last frame.
    pub fn once(frames: Vec<Frame>) -> Self {
        Self::new(frames, false)
    }

    /// Advance animation by one tick.
    pub fn advance_tick(&mut self) {
        if self.finished || self.frames.is_empty() {
            return;
        }

        self.tick_counter += 1;
        let duration = self.frames[self.current_index].duration_ticks.max(1);
        if self.tick_counter < duration {
            return;
        }

        self.tick_counter = 0;
        if self.current_index + 1 < self.frames.len() {
            self.current_index += 1;
        } else if self.looping {
            self.current_index = 0;
        } else {
            self.finished = true;
        }
    }

    /// Rewind to frame 0 and clear the finished state.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.tick_counter = 0;
        self.finished = false;
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.get(self.current_index)
    }

    /// Shape of the current frame; `None` for an empty animation.
    pub fn current_shape(&self) -> Option<ShapeHandle> {
        self.current_frame().map(|f| f.shape)
    }

    /// Offset of the current frame; zero for an empty animation.
    pub fn current_offset(&self) -> IVec2 {
        self.current_frame().map(|f| f.offset).unwrap_or(IVec2::ZERO)
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Only a one-shot animation that reached its end is finished.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
        if looping {
            self.finished = false;
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total ticks of one pass through all frames.
    pub fn total_ticks(&self) -> u32 {
        self.frames.iter().map(|f| f.duration_ticks.max(1)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_frames(looping: bool) -> Animation {
        Animation::new(
            vec![
                Frame::new(ShapeHandle(10), 2),
                Frame::new(ShapeHandle(11), 3).with_offset(0, -1),
            ],
            looping,
        )
    }

    #[test]
    fn starts_on_first_frame() {
        let anim = two_frames(true);
        assert_eq!(anim.current_index(), 0);
        assert_eq!(anim.current_shape(), Some(ShapeHandle(10)));
        assert_eq!(anim.current_offset(), IVec2::ZERO);
        assert!(!anim.is_finished());
    }

    #[test]
    fn frame_changes_after_its_duration() {
        let mut anim = two_frames(true);
        anim.advance_tick();
        assert_eq!(anim.current_index(), 0);
        anim.advance_tick();
        assert_eq!(anim.current_index(), 1);
        assert_eq!(anim.current_offset(), IVec2::new(0, -1));
    }

    #[test]
    fn non_looping_animation_freezes_on_last_frame() {
        let mut anim = two_frames(false);
        for tick in 1..=40 {
            anim.advance_tick();
            if tick >= 6 {
                assert!(anim.is_finished(), "should be finished at tick {tick}");
                assert_eq!(anim.current_index(), 1);
                assert_eq!(anim.current_shape(), Some(ShapeHandle(11)));
            }
        }
    }

    #[test]
    fn looping_animation_has_period_of_total_duration() {
        let mut anim = two_frames(true);
        assert_eq!(anim.total_ticks(), 5);
        let mut indices = Vec::new();
        for _ in 0..15 {
            anim.advance_tick();
            indices.push(anim.current_index());
        }
        // ticks 1..=15
        assert_eq!(indices[4], 0, "back to frame 0 at tick 5");
        assert_eq!(&indices[0..5], &indices[5..10]);
        assert_eq!(&indices[5..10], &indices[10..15]);
        assert!(!anim.is_finished());
    }

    #[test]
    fn empty_animation_is_inert() {
        let mut anim = Animation::looping(Vec::new());
        anim.advance_tick();
        assert!(anim.is_empty());
        assert_eq!(anim.current_shape(), None);
        assert_eq!(anim.current_offset(), IVec2::ZERO);
    }

    #[test]
    fn reset_restarts_finished_animation() {
        let mut anim = two_frames(false);
        for _ in 0..10 {
            anim.advance_tick();
        }
        assert!(anim.is_finished());
        anim.reset();
        assert!(!anim.is_finished());
        assert_eq!(anim.current_index(), 0);
    }
}
