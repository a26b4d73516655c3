mod bind_state;
pub use bind_state::*;
mod cpu;
pub use cpu::*;
mod enums;
pub use enums::*;
mod marker_info;
pub use marker_info::*;
mod wifi_display;
pub use wifi_display::*;
