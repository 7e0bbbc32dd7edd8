#![forbid(unsafe_code)]

//! Property tests for resize debouncing and motion coalescing.

use std::time::{Duration, Instant};

use globeterm_core::{InputEvent, Position};
use globeterm_runtime::resize::{RESIZE_DEADLINE, RESIZE_DELAY};
use globeterm_runtime::{EventQueue, ResizeDebouncer};
use proptest::prelude::*;

fn burst() -> impl Strategy<Value = Vec<(u64, u16, u16)>> {
    proptest::collection::vec((0u64..120, 20u16..300, 10u16..100), 1..40)
}

proptest! {
    #[test]
    fn applied_size_is_latest_and_within_deadline(events in burst()) {
        let t0 = Instant::now();
        let mut d = ResizeDebouncer::new((1, 1));
        let mut now = t0;
        let mut first: Option<Instant> = None;
        let mut latest = (1, 1);

        for (gap, w, h) in events {
            now += Duration::from_millis(gap);
            if let Some(size) = d.tick_at(now) {
                prop_assert_eq!(size, latest);
                let started = first.take().unwrap();
                prop_assert!(now.duration_since(started) <= RESIZE_DEADLINE + Duration::from_millis(120));
            }
            d.handle_resize_at(w, h, now);
            if d.has_pending() && first.is_none() {
                first = Some(now);
            }
            latest = (w, h);
        }

        // After a quiet period everything settles on the last size.
        let settled = d.tick_at(now + RESIZE_DELAY);
        if let Some(size) = settled {
            prop_assert_eq!(size, latest);
        }
        prop_assert!(!d.has_pending());
        prop_assert_eq!(d.applied(), latest);
    }

    #[test]
    fn queue_never_holds_adjacent_motion(
        kinds in proptest::collection::vec(0u8..3, 0..60),
    ) {
        let mut q = EventQueue::new();
        for (i, kind) in kinds.iter().enumerate() {
            let pos = Position::new(i as u16, 0);
            let event = match kind {
                0 => InputEvent::Motion { pos },
                1 => InputEvent::ButtonRelease { pos },
                _ => InputEvent::ButtonPress { pos, button: globeterm_core::MouseButton::Left },
            };
            q.push(event);
        }
        let mut previous_motion = false;
        while let Some(event) = q.pop() {
            prop_assert!(!(previous_motion && event.is_motion()));
            previous_motion = event.is_motion();
        }
    }
}
