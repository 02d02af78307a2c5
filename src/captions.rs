//! Whimsical captions attached to every result
//!
//! Selection goes through [`CaptionPicker`] so tests can pin the choice.

use rand::Rng;

pub const CAPTIONS: [&str; 6] = [
    "Nature's got jokes! 🌤️",
    "When clouds have better imagination than humans 🤭",
    "Sky doodles by Mother Nature 🎨",
    "Clouds: Nature's abstract artists 🎭",
    "The sky is the limit for cloud creativity ✨",
    "Every cloud has a silver lining... and a funny shape! 😄",
];

/// Source of the index used to pick a caption.
pub trait CaptionPicker: Send + Sync {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Picks uniformly at random from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCaptionPicker;

impl CaptionPicker for RandomCaptionPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the same index, wrapped into range.
#[derive(Debug, Clone, Copy)]
pub struct FixedCaptionPicker(pub usize);

impl CaptionPicker for FixedCaptionPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

pub fn choose_caption(picker: &dyn CaptionPicker) -> &'static str {
    CAPTIONS[picker.pick(CAPTIONS.len())]
}
