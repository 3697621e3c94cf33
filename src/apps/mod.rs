//! Console applications launched from the shell or a demo binary
pub mod ascii;
pub mod bigclock;
pub mod snake;
pub mod tetris;
pub mod timer;
pub mod todo;
