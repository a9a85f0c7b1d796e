use std::time::Duration;

/// Realizes the pauses between animation frames and flash phases.
pub trait Pacer {
    /// Waits for `duration` before the next frame is drawn.
    fn delay(&mut self, duration: Duration);
}

/// Blocks the calling thread for each delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThreadSleep;

impl Pacer for ThreadSleep {
    fn delay(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Never waits. For headless rendering, and for hosts that pace frames with their own timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoDelay;

impl Pacer for NoDelay {
    fn delay(&mut self, _duration: Duration) {}
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}
