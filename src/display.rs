//! One handle per hardware video layer.
//!
//! Built from the memory map in `wiring`, all layers sharing a single
//! transport (typically `&RefCell<SpiBridgeBus<..>>`).

use crate::bus::RegisterBus;
use crate::frame::FrameSurface;
use crate::osd::OverlaySurface;
use crate::sprite::{FilterLayer, SpriteSurface};
use crate::wiring::{video_addr, FRAME_BASE, V1_MOUSE, V2_OSD, V3_GHOST, V6_GRAY, V7_BAR};

pub struct VideoLayers<B> {
    pub frame: FrameSurface<B>,
    pub osd: OverlaySurface<B>,
    pub mouse: SpriteSurface<B>,
    pub ghost: SpriteSurface<B>,
    pub bar: FilterLayer<B>,
    pub gray: FilterLayer<B>,
}

impl<B: RegisterBus + Clone> VideoLayers<B> {
    pub fn new(bus: B) -> Self {
        Self {
            frame: FrameSurface::new(bus.clone(), FRAME_BASE),
            osd: OverlaySurface::new(bus.clone(), video_addr(V2_OSD)),
            mouse: SpriteSurface::new(bus.clone(), video_addr(V1_MOUSE)),
            ghost: SpriteSurface::new(bus.clone(), video_addr(V3_GHOST)),
            bar: FilterLayer::new(bus.clone(), video_addr(V7_BAR)),
            gray: FilterLayer::new(bus, video_addr(V6_GRAY)),
        }
    }

    /// Take every layer out of the composited output.
    pub fn blank_all(&mut self) {
        self.frame.bypass(true);
        self.bar.bypass(true);
        self.gray.bypass(true);
        self.ghost.bypass(true);
        self.osd.bypass(true);
        self.mouse.bypass(true);
    }
}
