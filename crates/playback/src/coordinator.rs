//! Preview playback coordinator.

use mixcut_common::{MixcutError, MixcutResult};
use mixcut_host_core::{MediaElement, MediaHost, MediaMetadata, ReadyState, TickScheduler};
use mixcut_media_model::{MusicTrack, PlaybackRate, PlaybackSettings, TrimRange, VisualFilter};
use mixcut_processing_core::compose;
use tracing::{debug, warn};

/// Poll an element's readiness, yielding one tick between polls.
///
/// Returns the metadata once the element is ready. A failed load or running
/// out of ticks is an error.
pub fn wait_until_ready(
    element: &dyn MediaElement,
    scheduler: &mut dyn TickScheduler,
    max_ticks: u32,
) -> MixcutResult<MediaMetadata> {
    for _ in 0..max_ticks {
        match element.ready_state() {
            ReadyState::Ready => return element.metadata(),
            ReadyState::Failed => {
                return Err(MixcutError::media("source failed to load"));
            }
            ReadyState::Loading => {
                scheduler.wait_tick();
            }
        }
    }
    Err(MixcutError::media(format!(
        "source metadata not available after {max_ticks} ticks"
    )))
}

/// Coordinates the visible video element and an optional music element.
///
/// One coordinator per media source: loading a different source means
/// dropping the coordinator and building a fresh one, which is what resets
/// trim, settings, and track selection to their defaults.
pub struct PlaybackCoordinator {
    video: Box<dyn MediaElement>,
    music: Option<Box<dyn MediaElement>>,
    selected_track: Option<MusicTrack>,
    trim: TrimRange,
    settings: PlaybackSettings,
    duration_secs: f64,
    playing: bool,
}

impl PlaybackCoordinator {
    /// Take ownership of a ready video element.
    ///
    /// The element's metadata must already be available; use
    /// [`wait_until_ready`] first when it may still be loading.
    pub fn new(mut video: Box<dyn MediaElement>) -> MixcutResult<Self> {
        let metadata = video.metadata()?;
        if metadata.duration_secs <= 0.0 {
            return Err(MixcutError::media("source reports no duration"));
        }
        let settings = PlaybackSettings::default();
        video.set_volume(settings.video_volume)?;
        video.set_rate(settings.rate.as_f64())?;
        Ok(Self {
            video,
            music: None,
            selected_track: None,
            trim: TrimRange::full(metadata.duration_secs),
            settings,
            duration_secs: metadata.duration_secs,
            playing: false,
        })
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn trim(&self) -> &TrimRange {
        &self.trim
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn selected_track(&self) -> Option<&MusicTrack> {
        self.selected_track.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current position of the driving video element.
    pub fn position(&self) -> f64 {
        self.video.current_time()
    }

    /// Wall-clock seconds the trimmed segment occupies at the current rate.
    pub fn effective_duration(&self) -> f64 {
        self.trim.effective_duration(self.settings.rate.as_f64())
    }

    /// Composed filter expression for the preview surface.
    pub fn filter_expression(&self) -> String {
        compose(self.settings.visual_filter, self.settings.hd_upscale)
    }

    pub fn set_trim_start(&mut self, value: f64) -> bool {
        self.trim.set_start(value)
    }

    pub fn set_trim_end(&mut self, value: f64) -> bool {
        self.trim.set_end(value)
    }

    pub fn set_trim_bounds(&mut self, start: f64, end: f64) -> bool {
        self.trim.set_bounds(start, end)
    }

    /// Apply a rate to every participating element.
    pub fn set_rate(&mut self, rate: PlaybackRate) -> MixcutResult<()> {
        self.settings.rate = rate;
        self.video.set_rate(rate.as_f64())?;
        if let Some(music) = self.music.as_mut() {
            music.set_rate(rate.as_f64())?;
        }
        Ok(())
    }

    pub fn set_video_volume(&mut self, volume: f64) -> MixcutResult<()> {
        self.settings.video_volume = volume.clamp(0.0, 1.0);
        self.video.set_volume(self.settings.video_volume)
    }

    pub fn set_music_volume(&mut self, volume: f64) -> MixcutResult<()> {
        self.settings.music_volume = volume.clamp(0.0, 1.0);
        if let Some(music) = self.music.as_mut() {
            music.set_volume(self.settings.music_volume)?;
        }
        Ok(())
    }

    pub fn set_visual_filter(&mut self, filter: VisualFilter) {
        self.settings.visual_filter = filter;
    }

    pub fn set_voice_clarity(&mut self, enabled: bool) {
        self.settings.voice_clarity = enabled;
    }

    pub fn set_hd_upscale(&mut self, enabled: bool) {
        self.settings.hd_upscale = enabled;
    }

    /// Swap the selected music track.
    ///
    /// A track that cannot be loaded degrades the preview to video-only
    /// audio; the selection itself is kept so the UI state stays coherent.
    pub fn select_track(
        &mut self,
        host: &mut dyn MediaHost,
        track: Option<&MusicTrack>,
    ) -> MixcutResult<()> {
        if let Some(music) = self.music.as_mut() {
            music.pause()?;
        }
        self.music = None;
        self.selected_track = track.cloned();

        let Some(track) = track else {
            return Ok(());
        };
        debug!(track = %track.name, "preview: selecting music track");
        match host.create_music_element(&track.url) {
            Ok(mut element) => {
                element.set_looping(true)?;
                element.set_volume(self.settings.music_volume)?;
                element.set_rate(self.settings.rate.as_f64())?;
                if self.playing {
                    if let Err(error) = element.play() {
                        warn!(%error, track = %track.name, "preview music failed to start");
                    }
                }
                self.music = Some(element);
            }
            Err(error) => {
                warn!(%error, track = %track.name, "preview music unavailable");
            }
        }
        Ok(())
    }

    /// Flip between playing and paused.
    ///
    /// Starting from a position outside the trim window first snaps back to
    /// the trim start. Returns the new playing state.
    pub fn toggle_play(&mut self) -> MixcutResult<bool> {
        if self.playing {
            self.pause()?;
        } else {
            let position = self.video.current_time();
            if !self.trim.contains(position) {
                self.video.seek(self.trim.start())?;
            }
            self.video.play()?;
            if let Some(music) = self.music.as_mut() {
                music.set_rate(self.settings.rate.as_f64())?;
                if let Err(error) = music.play() {
                    warn!(%error, "preview music failed to start");
                }
            }
            self.playing = true;
        }
        Ok(self.playing)
    }

    /// Pause every participating element.
    pub fn pause(&mut self) -> MixcutResult<()> {
        self.video.pause()?;
        if let Some(music) = self.music.as_mut() {
            music.pause()?;
        }
        self.playing = false;
        Ok(())
    }

    /// Scrub the video to a position.
    pub fn scrub(&mut self, position_secs: f64) -> MixcutResult<()> {
        self.video.seek(position_secs)
    }

    /// React to playback time advancing.
    ///
    /// When the video crosses the trim end, it snaps back to the trim start
    /// and the music rewinds to its own beginning. Render runs never call
    /// this; they stop at the trim end instead of looping.
    pub fn on_time_advance(&mut self) -> MixcutResult<()> {
        let position = self.video.current_time();
        if let Some(target) = self.trim.loop_target(position) {
            self.video.seek(target)?;
            if let Some(music) = self.music.as_mut() {
                music.seek(0.0)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use mixcut_host_sim::{ElementKind, SimFaults, SimHost, SimHostConfig};

    fn host_with(config: SimHostConfig) -> SimHost {
        SimHost::with_config(config)
    }

    fn coordinator_over(host: &mut SimHost) -> PlaybackCoordinator {
        let video = host.create_video_element(Path::new("clip.mp4")).unwrap();
        PlaybackCoordinator::new(video).unwrap()
    }

    #[test]
    fn test_wait_until_ready_polls_out_simulated_load_latency() {
        let mut host = host_with(SimHostConfig {
            readiness_polls: 3,
            ..SimHostConfig::default()
        });
        let mut scheduler = host.scheduler(30);
        let video = host.create_video_element(Path::new("clip.mp4")).unwrap();

        let metadata = wait_until_ready(video.as_ref(), &mut scheduler, 10).unwrap();
        assert_eq!(metadata.duration_secs, 60.0);
        assert_eq!((metadata.width, metadata.height), (1920, 1080));
    }

    #[test]
    fn test_wait_until_ready_gives_up_after_max_ticks() {
        let mut host = host_with(SimHostConfig {
            readiness_polls: 50,
            ..SimHostConfig::default()
        });
        let mut scheduler = host.scheduler(30);
        let video = host.create_video_element(Path::new("clip.mp4")).unwrap();

        assert!(wait_until_ready(video.as_ref(), &mut scheduler, 5).is_err());
    }

    #[test]
    fn test_wait_until_ready_surfaces_a_failed_load() {
        let mut host = host_with(SimHostConfig {
            faults: SimFaults {
                video_load_fails: true,
                ..SimFaults::default()
            },
            ..SimHostConfig::default()
        });
        let mut scheduler = host.scheduler(30);
        let video = host.create_video_element(Path::new("clip.mp4")).unwrap();

        let error = wait_until_ready(video.as_ref(), &mut scheduler, 10).unwrap_err();
        assert!(error.to_string().contains("failed to load"));
    }

    #[test]
    fn test_new_coordinator_has_default_settings_and_full_trim() {
        let mut host = SimHost::new();
        let coord = coordinator_over(&mut host);

        assert_eq!(coord.settings(), &PlaybackSettings::default());
        assert_eq!(coord.trim().start(), 0.0);
        assert_eq!(coord.trim().end(), 60.0);
        assert!(!coord.is_playing());
    }

    #[test]
    fn test_toggle_play_resets_position_outside_trim() {
        let mut host = SimHost::new();
        let mut coord = coordinator_over(&mut host);
        coord.set_trim_bounds(10.0, 20.0);
        coord.scrub(50.0).unwrap();

        assert!(coord.toggle_play().unwrap());
        assert!((coord.position() - 10.0).abs() < 1e-9);

        assert!(!coord.toggle_play().unwrap());
        let video = &host.ledger().elements_of(ElementKind::Video)[0];
        assert!(!video.playing);
    }

    #[test]
    fn test_play_inside_trim_keeps_position() {
        let mut host = SimHost::new();
        let mut coord = coordinator_over(&mut host);
        coord.set_trim_bounds(10.0, 20.0);
        coord.scrub(15.0).unwrap();
        coord.toggle_play().unwrap();
        assert!((coord.position() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_loop_within_trim_rewinds_music_to_zero() {
        let mut host = SimHost::new();
        let clock = host.clock();
        let mut coord = coordinator_over(&mut host);
        let track = mixcut_media_model::builtin_catalog().remove(2);
        coord.select_track(&mut host, Some(&track)).unwrap();
        coord.set_trim_bounds(0.0, 5.0);
        coord.toggle_play().unwrap();

        clock.advance_secs(6.0);
        coord.on_time_advance().unwrap();

        assert!((coord.position() - 0.0).abs() < 1e-9);
        let music = &host.ledger().elements_of(ElementKind::Music)[0];
        assert!((music.position_secs - 0.0).abs() < 1e-9);
        assert!(music.playing);
    }

    #[test]
    fn test_time_advance_inside_trim_is_a_no_op() {
        let mut host = SimHost::new();
        let clock = host.clock();
        let mut coord = coordinator_over(&mut host);
        coord.set_trim_bounds(0.0, 10.0);
        coord.toggle_play().unwrap();
        clock.advance_secs(4.0);
        coord.on_time_advance().unwrap();
        assert!((coord.position() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_change_applies_to_both_elements() {
        let mut host = SimHost::new();
        let mut coord = coordinator_over(&mut host);
        let track = mixcut_media_model::builtin_catalog().remove(0);
        coord.select_track(&mut host, Some(&track)).unwrap();
        coord.set_rate(PlaybackRate::Double).unwrap();

        let ledger = host.ledger();
        for element in ledger.elements() {
            assert!((element.rate - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_music_volume_applies_to_music_only() {
        let mut host = SimHost::new();
        let mut coord = coordinator_over(&mut host);
        let track = mixcut_media_model::builtin_catalog().remove(0);
        coord.select_track(&mut host, Some(&track)).unwrap();
        coord.set_music_volume(0.8).unwrap();
        coord.set_video_volume(0.5).unwrap();

        let ledger = host.ledger();
        let music = &ledger.elements_of(ElementKind::Music)[0];
        let video = &ledger.elements_of(ElementKind::Video)[0];
        assert!((music.volume - 0.8).abs() < 1e-9);
        assert!((video.volume - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unloadable_music_degrades_preview() {
        let mut host = host_with(SimHostConfig {
            faults: SimFaults {
                music_load_fails: true,
                ..SimFaults::default()
            },
            ..SimHostConfig::default()
        });
        let mut coord = coordinator_over(&mut host);
        let track = mixcut_media_model::builtin_catalog().remove(0);
        coord.select_track(&mut host, Some(&track)).unwrap();

        // Video playback is unaffected by the broken track.
        assert!(coord.toggle_play().unwrap());
        assert!(coord.selected_track().is_some());
        let music = &host.ledger().elements_of(ElementKind::Music)[0];
        assert!(!music.playing);
    }

    #[test]
    fn test_deselecting_track_pauses_music() {
        let mut host = SimHost::new();
        let mut coord = coordinator_over(&mut host);
        let track = mixcut_media_model::builtin_catalog().remove(0);
        coord.select_track(&mut host, Some(&track)).unwrap();
        coord.toggle_play().unwrap();
        coord.select_track(&mut host, None).unwrap();

        assert!(coord.selected_track().is_none());
        let music = &host.ledger().elements_of(ElementKind::Music)[0];
        assert!(!music.playing);
    }

    #[test]
    fn test_effective_duration_uses_rate() {
        let mut host = SimHost::new();
        let mut coord = coordinator_over(&mut host);
        coord.set_trim_bounds(0.0, 30.0);
        coord.set_rate(PlaybackRate::Double).unwrap();
        assert!((coord.effective_duration() - 15.0).abs() < 1e-9);
    }
}
