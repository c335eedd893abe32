//! Servo bank driven by a single ticker event

use heapless::Vec;
use tickmux_core::{EventHandle, EventHandler, HardwareTimer, TickerContext, Timestamp};
use tickmux_hal::OutputPin;

use super::config::{ServoConfig, MAX_SERVOS, MIN_PULSE_WIDTH_US};

/// Resolution of per-channel pulse limits
const LIMIT_STEP_US: i32 = 4;

/// Largest number of limit steps a channel may move away from the default
const MAX_LIMIT_STEPS: i32 = 127;

/// Errors reported by the servo bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// No free channel left in the bank
    TooManyServos,
    /// Index does not name an attached channel
    InvalidIndex,
    /// Pulse limits too far from the defaults, or min not below max
    InvalidLimits,
    /// Timing configuration cannot produce a frame
    InvalidConfig,
}

/// Handle to one attached servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoIndex(u8);

impl ServoIndex {
    /// Position of the channel within its bank
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

struct Channel<P> {
    pin: P,
    pulse_us: u16,
    min_us: u16,
    max_us: u16,
    active: bool,
}

/// Up to `S` servos pulsed in turn from one ticker event
///
/// Register the bank as the ticker's event handler. The bank only reacts to
/// its own event id, the slot number of the handle it was built with.
pub struct ServoBank<P, const S: usize> {
    channels: Vec<Channel<P>, S>,
    event: EventHandle,
    event_id: u32,
    /// Channel whose pulse is in progress, `None` during the frame gap
    cursor: Option<usize>,
    frame_start: Timestamp,
    config: ServoConfig,
}

impl<P: OutputPin, const S: usize> ServoBank<P, S> {
    /// Create an empty bank that schedules itself with `event`
    pub fn new(event: EventHandle, config: ServoConfig) -> Result<Self, ServoError> {
        if S > MAX_SERVOS {
            return Err(ServoError::TooManyServos);
        }
        if !config.is_valid() {
            return Err(ServoError::InvalidConfig);
        }

        let event_id = event.slot() as u32;
        Ok(Self {
            channels: Vec::new(),
            event,
            event_id,
            cursor: None,
            frame_start: 0,
            config,
        })
    }

    /// Attach a servo on `pin` with the configured pulse limits
    pub fn attach<T: HardwareTimer, const N: usize>(
        &mut self,
        pin: P,
        ctx: &mut TickerContext<'_, T, N>,
    ) -> Result<ServoIndex, ServoError> {
        self.attach_with_limits(pin, self.config.min_pulse_us, self.config.max_pulse_us, ctx)
    }

    /// Attach a servo on `pin` with custom pulse limits
    ///
    /// Limits are rounded towards the configured defaults in 4 us steps and
    /// may differ from them by at most 127 steps. The first attached servo
    /// starts the pulse train after the configured start delay.
    pub fn attach_with_limits<T: HardwareTimer, const N: usize>(
        &mut self,
        mut pin: P,
        min_us: u16,
        max_us: u16,
        ctx: &mut TickerContext<'_, T, N>,
    ) -> Result<ServoIndex, ServoError> {
        let min_us = quantize(self.config.min_pulse_us, min_us)?;
        let max_us = quantize(self.config.max_pulse_us, max_us)?;
        if min_us >= max_us {
            return Err(ServoError::InvalidLimits);
        }

        let index = self.channels.len();
        pin.set_low();
        self.channels
            .push(Channel {
                pin,
                pulse_us: self.config.default_pulse_us.clamp(min_us, max_us),
                min_us,
                max_us,
                active: true,
            })
            .map_err(|_| ServoError::TooManyServos)?;

        if !ctx.is_pending(&self.event) {
            self.cursor = None;
            let start = ctx
                .current_time()
                .wrapping_add(self.config.ticks(self.config.start_delay_us));
            ctx.insert_event(&self.event, start, self.event_id);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("servo {}: attached, {}..{} us", index, min_us, max_us);

        Ok(ServoIndex(index as u8))
    }

    /// Stop pulsing a servo
    ///
    /// The pulse train stops entirely once no servo is attached.
    pub fn detach<T: HardwareTimer, const N: usize>(
        &mut self,
        index: ServoIndex,
        ctx: &mut TickerContext<'_, T, N>,
    ) -> Result<(), ServoError> {
        let channel = self
            .channels
            .get_mut(index.index())
            .ok_or(ServoError::InvalidIndex)?;
        channel.active = false;
        channel.pin.set_low();

        if !self.channels.iter().any(|c| c.active) {
            ctx.remove_event(&self.event);
            self.cursor = None;
        }
        Ok(())
    }

    /// Set the position
    ///
    /// Values below the minimum pulse width are angles in degrees, clamped
    /// to 0..=180. Anything else is a pulse width in microseconds.
    pub fn write(&mut self, index: ServoIndex, value: i32) -> Result<(), ServoError> {
        let channel = self.channel(index)?;
        let value = if value < MIN_PULSE_WIDTH_US as i32 {
            map(
                value.clamp(0, 180),
                0,
                180,
                channel.min_us as i32,
                channel.max_us as i32,
            )
        } else {
            value
        };
        self.write_microseconds(index, value)
    }

    /// Set the pulse width, clamped to the channel's limits
    pub fn write_microseconds(&mut self, index: ServoIndex, us: i32) -> Result<(), ServoError> {
        let channel = self
            .channels
            .get_mut(index.index())
            .ok_or(ServoError::InvalidIndex)?;
        channel.pulse_us = us.clamp(channel.min_us as i32, channel.max_us as i32) as u16;
        Ok(())
    }

    /// Current position in degrees
    pub fn read(&self, index: ServoIndex) -> Result<i32, ServoError> {
        let channel = self.channel(index)?;
        // +1 undoes the truncation in `write`
        Ok(map(
            channel.pulse_us as i32 + 1,
            channel.min_us as i32,
            channel.max_us as i32,
            0,
            180,
        ))
    }

    /// Current pulse width in microseconds
    pub fn read_microseconds(&self, index: ServoIndex) -> Result<u16, ServoError> {
        Ok(self.channel(index)?.pulse_us)
    }

    /// True if the servo is being pulsed
    pub fn attached(&self, index: ServoIndex) -> bool {
        self.channel(index).map(|c| c.active).unwrap_or(false)
    }

    /// Output pin of a servo
    pub fn pin(&self, index: ServoIndex) -> Option<&P> {
        self.channels.get(index.index()).map(|c| &c.pin)
    }

    /// Number of channels ever attached
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True if nothing has been attached
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    fn channel(&self, index: ServoIndex) -> Result<&Channel<P>, ServoError> {
        self.channels
            .get(index.index())
            .ok_or(ServoError::InvalidIndex)
    }
}

impl<P, T, const S: usize, const N: usize> EventHandler<T, N> for ServoBank<P, S>
where
    P: OutputPin,
    T: HardwareTimer,
{
    fn on_event(&mut self, id: u32, ctx: &mut TickerContext<'_, T, N>) {
        if id != self.event_id {
            return;
        }

        let now = ctx.current_time();
        match self.cursor {
            None => self.frame_start = now,
            Some(i) => {
                if let Some(channel) = self.channels.get_mut(i) {
                    if channel.active {
                        channel.pin.set_low();
                    }
                }
            }
        }

        let next = self.cursor.map_or(0, |i| i + 1);
        match self.channels.get_mut(next) {
            Some(channel) => {
                self.cursor = Some(next);
                let end = now.wrapping_add(self.config.ticks(channel.pulse_us as u32));
                ctx.insert_event(&self.event, end, self.event_id);
                if channel.active {
                    channel.pin.set_high();
                }
            }
            None => {
                let elapsed_us = self.config.micros(now.wrapping_sub(self.frame_start));
                let gap = self.config.frame_gap_us(elapsed_us);
                self.cursor = None;
                ctx.insert_event(
                    &self.event,
                    now.wrapping_add(self.config.ticks(gap)),
                    self.event_id,
                );
            }
        }
    }
}

/// Linear rescale with integer truncation
fn map(x: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Round a limit towards `base` in whole steps
fn quantize(base: u16, value: u16) -> Result<u16, ServoError> {
    let steps = (base as i32 - value as i32) / LIMIT_STEP_US;
    if steps.abs() > MAX_LIMIT_STEPS {
        return Err(ServoError::InvalidLimits);
    }
    Ok((base as i32 - steps * LIMIT_STEP_US) as u16)
}
