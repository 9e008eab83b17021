mod tests {
    use std::collections::VecDeque;
    use std::pin::{Pin, pin};
    use std::task::{Context, Poll, Waker};

    use myrtio_rgb_engine::config::{PARTY_HZ_MAX, PARTY_HZ_MIN};
    use myrtio_rgb_engine::tempo::{
        AsyncPlaybackClient, FetchError, MusicSnapshot, PlaybackClient, PlaybackRequest,
        PlaybackResponse, PollOutcome, PollState, ScanExtractor, TempoAcquisition,
    };
    use myrtio_rgb_engine::{Duration, Instant, SharedState, TempoConfig};

    enum Reply {
        Body(u16, &'static str),
        Error(FetchError),
    }

    /// Replays canned responses and counts requests
    struct ScriptedClient {
        replies: VecDeque<Reply>,
        calls: usize,
        last_timeout: Option<Duration>,
    }

    impl ScriptedClient {
        fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                replies: replies.into_iter().collect(),
                calls: 0,
                last_timeout: None,
            }
        }
    }

    impl PlaybackClient for ScriptedClient {
        fn get(
            &mut self,
            request: &PlaybackRequest<'_>,
            body: &mut [u8],
        ) -> Result<PlaybackResponse, FetchError> {
            self.calls += 1;
            self.last_timeout = Some(request.timeout);
            match self.replies.pop_front() {
                Some(Reply::Body(status, text)) => {
                    let bytes = text.as_bytes();
                    if bytes.len() > body.len() {
                        return Err(FetchError::BodyTooLarge);
                    }
                    body[..bytes.len()].copy_from_slice(bytes);
                    Ok(PlaybackResponse::new(status, bytes.len()))
                }
                Some(Reply::Error(err)) => Err(err),
                None => Err(FetchError::Transport),
            }
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn snapshot(body: &str, previous: &MusicSnapshot) -> MusicSnapshot {
        MusicSnapshot::from_fields(&ScanExtractor::new(body), previous, at(0))
    }

    #[test]
    fn test_snapshot_fields() {
        let body = r#"{"track":"A","artist":"X","albumArt":"u","nextTrack":"B","nextArtist":"Y","durationMs":1000,"progressMs":10,"bpm":120}"#;
        let snap = snapshot(body, &MusicSnapshot::empty());
        assert!(snap.valid);
        assert_eq!(snap.track.as_str(), "A");
        assert_eq!(snap.artist.as_str(), "X");
        assert_eq!(snap.album_art.as_str(), "u");
        assert_eq!(snap.next_track.as_str(), "B");
        assert_eq!(snap.next_artist.as_str(), "Y");
        assert_eq!(snap.duration_ms, 1000);
        assert_eq!(snap.progress_ms, 10);
        assert_eq!(snap.bpm, 120.0);
        assert!(snap.has_tempo());
    }

    #[test]
    fn test_snapshot_without_track_is_invalid() {
        let snap = snapshot(r#"{"bpm":128}"#, &MusicSnapshot::empty());
        assert!(!snap.valid);
        assert_eq!(snap.bpm, 128.0);
        assert_eq!(snap.duration_ms, -1);
    }

    #[test]
    fn test_bpm_carried_for_same_track() {
        let first = snapshot(r#"{"track":"A","bpm":120}"#, &MusicSnapshot::empty());
        let second = snapshot(r#"{"track":"A","bpm":0}"#, &first);
        assert_eq!(second.bpm, 120.0);

        let missing = snapshot(r#"{"track":"A"}"#, &second);
        assert_eq!(missing.bpm, 120.0);
    }

    #[test]
    fn test_bpm_dropped_for_new_track() {
        let first = snapshot(r#"{"track":"A","bpm":120}"#, &MusicSnapshot::empty());
        let second = snapshot(r#"{"track":"B","bpm":0}"#, &first);
        assert_eq!(second.bpm, 0.0);
        assert!(!second.has_tempo());
    }

    #[test]
    fn test_bpm_not_carried_from_invalid_snapshot() {
        let mut previous = snapshot(r#"{"track":"A","bpm":120}"#, &MusicSnapshot::empty());
        previous.valid = false;
        let next = snapshot(r#"{"track":"A","bpm":-1}"#, &previous);
        assert_eq!(next.bpm, 0.0);
    }

    #[test]
    fn test_long_title_truncated() {
        let long = "x".repeat(200);
        let body = format!(r#"{{"track":"{}"}}"#, long);
        let snap = snapshot(&body, &MusicSnapshot::empty());
        assert_eq!(snap.track.len(), myrtio_rgb_engine::tempo::TITLE_CAPACITY);
    }

    #[test]
    fn test_bounded_field_types_are_public() {
        use myrtio_rgb_engine::tempo::{ART_CAPACITY, ArtUrl, TITLE_CAPACITY, Title};

        let snap = snapshot(r#"{"track":"A","albumArt":"u"}"#, &MusicSnapshot::empty());
        let track: &Title = &snap.track;
        let art: &ArtUrl = &snap.album_art;
        assert_eq!(track.capacity(), TITLE_CAPACITY);
        assert_eq!(art.capacity(), ART_CAPACITY);
    }

    #[test]
    fn test_staleness() {
        let config = TempoConfig::default();
        let snap = MusicSnapshot::from_fields(
            &ScanExtractor::new(r#"{"track":"A"}"#),
            &MusicSnapshot::empty(),
            at(10_000),
        );
        assert!(!snap.is_stale(at(14_000), config.poll_interval, config.grace));
        assert!(snap.is_stale(at(14_001), config.poll_interval, config.grace));
    }

    #[test]
    fn test_poll_is_throttled() {
        let shared = SharedState::new();
        let mut client = ScriptedClient::new([
            Reply::Body(200, r#"{"track":"A","bpm":120}"#),
            Reply::Body(200, r#"{"track":"B","bpm":90}"#),
        ]);
        let mut tempo: TempoAcquisition = TempoAcquisition::new(TempoConfig::default());

        assert_eq!(tempo.step(at(0), &mut client, &shared), PollOutcome::Updated);
        assert_eq!(tempo.step(at(1000), &mut client, &shared), PollOutcome::Throttled);
        assert_eq!(tempo.step(at(2999), &mut client, &shared), PollOutcome::Throttled);
        assert_eq!(client.calls, 1);
        assert_eq!(shared.music.get().track.as_str(), "A");

        assert_eq!(tempo.step(at(3000), &mut client, &shared), PollOutcome::Updated);
        assert_eq!(client.calls, 2);
        assert_eq!(shared.music.get().track.as_str(), "B");
        assert_eq!(tempo.state(), PollState::Idle);
    }

    #[test]
    fn test_request_carries_clamped_timeout() {
        let shared = SharedState::new();
        let mut client = ScriptedClient::new([Reply::Body(200, r#"{"track":"A"}"#)]);
        let mut tempo: TempoAcquisition = TempoAcquisition::new(TempoConfig::default());
        tempo.step(at(0), &mut client, &shared);
        assert_eq!(client.last_timeout, Some(Duration::from_millis(2999)));
    }

    #[test]
    fn test_failure_keeps_previous_snapshot() {
        let shared = SharedState::new();
        let mut client = ScriptedClient::new([
            Reply::Body(200, r#"{"track":"A","bpm":120}"#),
            Reply::Error(FetchError::Timeout),
            Reply::Body(200, "   "),
            Reply::Body(503, r#"{"track":"B","bpm":60}"#),
        ]);
        let mut tempo: TempoAcquisition = TempoAcquisition::new(TempoConfig::default());

        assert_eq!(tempo.step(at(0), &mut client, &shared), PollOutcome::Updated);
        assert_eq!(
            tempo.step(at(3000), &mut client, &shared),
            PollOutcome::Failed(FetchError::Timeout)
        );
        assert_eq!(
            tempo.step(at(6000), &mut client, &shared),
            PollOutcome::Failed(FetchError::EmptyBody)
        );
        assert_eq!(
            tempo.step(at(9000), &mut client, &shared),
            PollOutcome::Failed(FetchError::Status(503))
        );

        let music = shared.music.get();
        assert_eq!(music.track.as_str(), "A");
        assert_eq!(music.bpm, 120.0);
        assert_eq!(music.updated_at, at(0));
        // Failed attempts still count for the throttle
        assert_eq!(tempo.last_attempt(), Some(at(9000)));
    }

    #[test]
    fn test_invalid_utf8_body() {
        struct Garbage;
        impl PlaybackClient for Garbage {
            fn get(
                &mut self,
                _request: &PlaybackRequest<'_>,
                body: &mut [u8],
            ) -> Result<PlaybackResponse, FetchError> {
                body[..2].copy_from_slice(&[0xff, 0xfe]);
                Ok(PlaybackResponse::new(200, 2))
            }
        }

        let shared = SharedState::new();
        let mut tempo: TempoAcquisition = TempoAcquisition::new(TempoConfig::default());
        assert_eq!(
            tempo.step(at(0), &mut Garbage, &shared),
            PollOutcome::Failed(FetchError::InvalidUtf8)
        );
        assert!(!shared.music.get().valid);
    }

    #[test]
    fn test_body_larger_than_buffer() {
        let shared = SharedState::new();
        let mut client = ScriptedClient::new([Reply::Body(200, r#"{"track":"far too long"}"#)]);
        let mut tempo: TempoAcquisition<8> = TempoAcquisition::new(TempoConfig::default());
        assert_eq!(
            tempo.step(at(0), &mut client, &shared),
            PollOutcome::Failed(FetchError::BodyTooLarge)
        );
    }

    #[test]
    fn test_continuity_across_polls() {
        let shared = SharedState::new();
        let mut client = ScriptedClient::new([
            Reply::Body(200, r#"{"track":"A","bpm":120}"#),
            Reply::Body(200, r#"{"track":"A","bpm":0}"#),
            Reply::Body(200, r#"{"track":"B","bpm":0}"#),
        ]);
        let mut tempo: TempoAcquisition = TempoAcquisition::new(TempoConfig::default());

        tempo.step(at(0), &mut client, &shared);
        tempo.step(at(3000), &mut client, &shared);
        assert_eq!(shared.music.get().bpm, 120.0);
        tempo.step(at(6000), &mut client, &shared);
        assert_eq!(shared.music.get().bpm, 0.0);
    }

    #[test]
    fn test_party_hz_clamped() {
        let shared = SharedState::new();
        assert_eq!(shared.party_hz.get(), 0.6);
        assert_eq!(shared.party_hz.set(100.0), PARTY_HZ_MAX);
        assert_eq!(shared.party_hz.set(0.0), PARTY_HZ_MIN);
        assert_eq!(shared.party_hz.set(f32::NAN), PARTY_HZ_MIN);
        assert_eq!(shared.party_hz.set(2.0), 2.0);
    }

    #[test]
    fn test_timeout_stays_below_interval() {
        let config = TempoConfig::default()
            .with_poll_interval(Duration::from_millis(500))
            .with_request_timeout(Duration::from_millis(200));
        assert_eq!(config.request_timeout(), Duration::from_millis(200));

        let shorter = config.with_poll_interval(Duration::from_millis(100));
        assert_eq!(shorter.request_timeout(), Duration::from_millis(99));
    }

    #[test]
    fn test_long_titles_with_shared_prefix_are_different_tracks() {
        let prefix = "y".repeat(80);
        let first_body = format!(r#"{{"track":"{}-one","bpm":120}}"#, prefix);
        let second_body = format!(r#"{{"track":"{}-two","bpm":0}}"#, prefix);
        let repeat_body = format!(r#"{{"track":"{}-one","bpm":0}}"#, prefix);

        let first = snapshot(&first_body, &MusicSnapshot::empty());
        let second = snapshot(&second_body, &first);
        assert_eq!(first.track, second.track);
        assert_eq!(second.bpm, 0.0);

        let repeat = snapshot(&repeat_body, &first);
        assert_eq!(repeat.bpm, 120.0);
    }

    /// Stays pending for a number of polls, then answers
    struct SlowClient {
        pending_polls: usize,
        reply: Result<&'static str, FetchError>,
        calls: usize,
    }

    impl SlowClient {
        fn new(pending_polls: usize, reply: Result<&'static str, FetchError>) -> Self {
            Self {
                pending_polls,
                reply,
                calls: 0,
            }
        }
    }

    impl AsyncPlaybackClient for SlowClient {
        fn get(
            &mut self,
            _request: &PlaybackRequest<'_>,
            body: &mut [u8],
        ) -> impl Future<Output = Result<PlaybackResponse, FetchError>> {
            self.calls += 1;
            let reply = self.reply;
            let mut remaining = self.pending_polls;
            std::future::poll_fn(move |_cx| {
                if remaining > 0 {
                    remaining -= 1;
                    return Poll::Pending;
                }
                Poll::Ready(reply.map(|text| {
                    let bytes = text.as_bytes();
                    body[..bytes.len()].copy_from_slice(bytes);
                    PlaybackResponse::new(200, bytes.len())
                }))
            })
        }
    }

    fn poll_once<F: Future>(future: Pin<&mut F>) -> Poll<F::Output> {
        future.poll(&mut Context::from_waker(Waker::noop()))
    }

    fn block_on<F: Future>(future: F) -> F::Output {
        let mut future = pin!(future);
        loop {
            if let Poll::Ready(output) = poll_once(future.as_mut()) {
                return output;
            }
        }
    }

    #[test]
    fn test_async_step_stamps_completion_time() {
        let shared = SharedState::new();
        let mut client = SlowClient::new(3, Ok(r#"{"track":"A","bpm":100}"#));
        let mut tempo: TempoAcquisition = TempoAcquisition::new(TempoConfig::default());

        let outcome = block_on(tempo.step_async(at(0), &mut client, &shared, || at(450)));
        assert_eq!(outcome, PollOutcome::Updated);
        assert_eq!(tempo.state(), PollState::Idle);
        assert_eq!(tempo.last_attempt(), Some(at(0)));

        let music = shared.music.get();
        assert_eq!(music.bpm, 100.0);
        assert_eq!(music.updated_at, at(450));

        let throttled = block_on(tempo.step_async(at(1000), &mut client, &shared, || at(1000)));
        assert_eq!(throttled, PollOutcome::Throttled);
        assert_eq!(client.calls, 1);
    }

    #[test]
    fn test_async_step_is_polling_while_in_flight() {
        let shared = SharedState::new();
        let mut client = SlowClient::new(1, Ok(r#"{"track":"A"}"#));
        let mut tempo: TempoAcquisition = TempoAcquisition::new(TempoConfig::default());

        let mut future = pin!(tempo.step_async(at(0), &mut client, &shared, || at(10)));
        assert!(poll_once(future.as_mut()).is_pending());
        assert_eq!(poll_once(future.as_mut()), Poll::Ready(PollOutcome::Updated));
    }

    #[test]
    fn test_dropped_async_step_is_busy_until_abandoned() {
        let shared = SharedState::new();
        let mut stuck = SlowClient::new(usize::MAX, Ok(r#"{"track":"A"}"#));
        let mut tempo: TempoAcquisition = TempoAcquisition::new(TempoConfig::default());

        {
            let mut future = pin!(tempo.step_async(at(0), &mut stuck, &shared, || at(0)));
            assert!(poll_once(future.as_mut()).is_pending());
        }
        assert_eq!(tempo.state(), PollState::Polling);

        let mut client = SlowClient::new(0, Ok(r#"{"track":"B","bpm":80}"#));
        // Interval elapsed, but the dropped request may still be alive
        let busy = block_on(tempo.step_async(at(3000), &mut client, &shared, || at(3000)));
        assert_eq!(busy, PollOutcome::Busy);
        // Poll interval plus the 2999 ms request timeout
        let still_busy = block_on(tempo.step_async(at(5998), &mut client, &shared, || at(5998)));
        assert_eq!(still_busy, PollOutcome::Busy);
        assert_eq!(client.calls, 0);
        assert!(!shared.music.get().valid);

        let recovered = block_on(tempo.step_async(at(5999), &mut client, &shared, || at(6000)));
        assert_eq!(recovered, PollOutcome::Updated);
        assert_eq!(client.calls, 1);
        assert_eq!(tempo.state(), PollState::Idle);
        assert_eq!(shared.music.get().track.as_str(), "B");
    }

    #[test]
    fn test_async_failure_keeps_previous_snapshot() {
        let shared = SharedState::new();
        let mut tempo: TempoAcquisition = TempoAcquisition::new(TempoConfig::default());

        let mut good = SlowClient::new(0, Ok(r#"{"track":"A","bpm":120}"#));
        block_on(tempo.step_async(at(0), &mut good, &shared, || at(5)));

        let mut failing = SlowClient::new(2, Err(FetchError::Timeout));
        let outcome = block_on(tempo.step_async(at(3000), &mut failing, &shared, || at(5999)));
        assert_eq!(outcome, PollOutcome::Failed(FetchError::Timeout));
        assert_eq!(tempo.state(), PollState::Idle);

        let music = shared.music.get();
        assert_eq!(music.track.as_str(), "A");
        assert_eq!(music.bpm, 120.0);
        assert_eq!(music.updated_at, at(5));
    }
}
