use crate::app::SPINNER_FRAME_COUNT;

const FRAMES: [char; SPINNER_FRAME_COUNT] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

pub fn frame(idx: usize) -> char {
    FRAMES[idx % FRAMES.len()]
}
