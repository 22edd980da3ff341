use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use smart_leds::RGB8;
use smart_leds_trait::SmartLedsWrite;

use crate::error_with_location;
use crate::mapper::{FrameOutcome, SpectrumMapper};
use crate::report::FpsReporter;
use crate::source::FrameSource;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub rendered: u64,
    pub skipped: u64,
}

/// Reads, maps and renders frames until the source ends or `stop` is set.
///
/// `stop` is checked once per frame, before the (blocking) read. The strand keeps
/// whatever was rendered last; clearing it is up to the caller.
pub fn run<F, S>(
    source: &mut F,
    mapper: &mut SpectrumMapper,
    strand: &mut S,
    stop: &AtomicBool,
    reporter: &mut FpsReporter,
) -> Result<RunStats>
where
    F: FrameSource + ?Sized,
    S: SmartLedsWrite<Color = RGB8>,
    S::Error: core::fmt::Debug,
{
    let mut stats = RunStats::default();
    log::info!("[lights] frame loop started");

    loop {
        if stop.load(Ordering::Relaxed) {
            log::info!("[lights] stop requested");
            break;
        }

        let Some(frame) = source.read_frame()? else {
            log::info!("[lights] audio source ended");
            break;
        };
        stats.frames += 1;

        match mapper.process(&frame) {
            FrameOutcome::Render(pixels) => {
                strand
                    .write(pixels.into_iter())
                    .map_err(|err| error_with_location!("Failed to write to strand: {:?}", err))?;
                stats.rendered += 1;
            }
            FrameOutcome::Skip(_) => stats.skipped += 1,
        }

        reporter.tick(mapper.levels(), mapper.intensities());
    }

    log::info!(
        "[lights] {} frames, {} rendered, {} skipped",
        stats.frames,
        stats.rendered,
        stats.skipped
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AudioFrame, ToneSource};
    use common::config::SpectrumConfig;
    use std::convert::Infallible;

    #[derive(Default)]
    struct Recorder {
        frames: Vec<Vec<RGB8>>,
    }

    impl SmartLedsWrite for Recorder {
        type Error = Infallible;
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            self.frames.push(iterator.into_iter().map(Into::into).collect());
            Ok(())
        }
    }

    struct Broken;

    impl SmartLedsWrite for Broken {
        type Error = &'static str;
        type Color = RGB8;

        fn write<T, I>(&mut self, _iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            Err("unplugged")
        }
    }

    struct Silence(u32);

    impl FrameSource for Silence {
        fn read_frame(&mut self) -> Result<Option<AudioFrame>> {
            if self.0 == 0 {
                return Ok(None);
            }
            self.0 -= 1;
            Ok(Some(AudioFrame::new(vec![0; 1024])))
        }
    }

    #[test]
    fn tone_frames_are_rendered() {
        let mut mapper = SpectrumMapper::new(SpectrumConfig::rainbow()).unwrap();
        let mut source = ToneSource::new(44100, 1024, vec![1000.0], 8000.0).with_frame_limit(5);
        let mut strand = Recorder::default();
        let stop = AtomicBool::new(false);

        let stats = run(
            &mut source,
            &mut mapper,
            &mut strand,
            &stop,
            &mut FpsReporter::new(2),
        )
        .unwrap();

        assert_eq!(stats, RunStats { frames: 5, rendered: 5, skipped: 0 });
        assert_eq!(strand.frames.len(), 5);
        assert!(strand.frames.iter().all(|f| f.len() == 100));
    }

    #[test]
    fn reporter_gets_levels_before_normalising() {
        let mut mapper = SpectrumMapper::new(SpectrumConfig::rainbow()).unwrap();
        let mut source = ToneSource::new(44100, 1024, vec![1000.0], 8000.0).with_frame_limit(1);
        run(
            &mut source,
            &mut mapper,
            &mut Recorder::default(),
            &AtomicBool::new(false),
            &mut FpsReporter::new(1),
        )
        .unwrap();

        let peak = mapper.levels().iter().copied().fold(0.0f32, f32::max);
        assert_eq!(mapper.levels().len(), 100);
        assert!(peak > 255.0, "{peak}");
        assert_eq!(mapper.intensities().iter().max(), Some(&255));
    }

    #[test]
    fn silence_never_touches_the_strand() {
        let mut mapper = SpectrumMapper::new(SpectrumConfig::index_banded()).unwrap();
        let mut strand = Recorder::default();
        let stats = run(
            &mut Silence(3),
            &mut mapper,
            &mut strand,
            &AtomicBool::new(false),
            &mut FpsReporter::disabled(),
        )
        .unwrap();

        assert_eq!(stats.skipped, 3);
        assert!(strand.frames.is_empty());
    }

    #[test]
    fn stop_flag_is_checked_before_reading() {
        let mut mapper = SpectrumMapper::new(SpectrumConfig::rainbow()).unwrap();
        let mut source = ToneSource::new(44100, 1024, vec![1000.0], 8000.0);
        let stats = run(
            &mut source,
            &mut mapper,
            &mut Recorder::default(),
            &AtomicBool::new(true),
            &mut FpsReporter::disabled(),
        )
        .unwrap();
        assert_eq!(stats.frames, 0);
    }

    #[test]
    fn strand_errors_end_the_loop() {
        let mut mapper = SpectrumMapper::new(SpectrumConfig::rainbow()).unwrap();
        let mut source = ToneSource::new(44100, 1024, vec![1000.0], 8000.0);
        let err = run(
            &mut source,
            &mut mapper,
            &mut Broken,
            &AtomicBool::new(false),
            &mut FpsReporter::disabled(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unplugged"));
    }
}
