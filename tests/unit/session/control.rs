use super::*;

#[test]
fn messages_serialize_to_protocol_shape() {
    let progress = Message::Progress {
        phase: Phase::Frames,
        pct: 10,
    };
    assert_eq!(
        serde_json::to_string(&progress).unwrap(),
        r#"{"type":"progress","phase":"frames","pct":10}"#
    );
    let err = Message::Error {
        message: "boom".to_owned(),
    };
    assert_eq!(
        serde_json::to_string(&err).unwrap(),
        r#"{"type":"error","message":"boom"}"#
    );
    let done = Message::Done {
        buffer: vec![1, 2, 3],
    };
    assert_eq!(serde_json::to_string(&done).unwrap(), r#"{"type":"done"}"#);
    assert!(done.is_terminal());
    assert!(!progress.is_terminal());
}

#[test]
fn progress_is_dropped_when_channel_is_full() {
    let (ctl, rx) = RunControl::new(CancelToken::new(), 1);
    ctl.progress(Phase::Frames, 0);
    ctl.progress(Phase::Frames, 10);
    ctl.progress(Phase::Encode, 250);
    assert_eq!(
        rx.try_recv().unwrap(),
        Message::Progress {
            phase: Phase::Frames,
            pct: 0
        }
    );
    assert!(rx.try_recv().is_err());

    ctl.progress(Phase::Encode, 250);
    assert_eq!(
        rx.try_recv().unwrap(),
        Message::Progress {
            phase: Phase::Encode,
            pct: 100
        }
    );
}

#[test]
fn finish_sends_done_once() {
    let (ctl, rx) = RunControl::new(CancelToken::new(), 4);
    let state = ctl.state_cell();
    ctl.enter(RunState::Decoding);
    ctl.finish(Ok(vec![7]));
    assert_eq!(rx.recv().unwrap(), Message::Done { buffer: vec![7] });
    assert!(rx.recv().is_err());
    assert_eq!(state.get(), RunState::Done);
}

#[test]
fn finish_reports_errors_verbatim() {
    let (ctl, rx) = RunControl::new(CancelToken::new(), 4);
    let state = ctl.state_cell();
    ctl.finish(Err(SeewavError::decode("bad header")));
    assert_eq!(
        rx.recv().unwrap(),
        Message::Error {
            message: "decode error: bad header".to_owned()
        }
    );
    assert_eq!(state.get(), RunState::Failed);
}

#[test]
fn cancelled_run_emits_no_terminal_message() {
    let cancel = CancelToken::new();
    let (ctl, rx) = RunControl::new(cancel.clone(), 4);
    let state = ctl.state_cell();
    cancel.cancel();
    assert!(ctl.checkpoint().unwrap_err().is_cancelled());
    ctl.progress(Phase::Frames, 50);
    ctl.finish(Ok(vec![1]));
    assert!(rx.recv().is_err());
    assert_eq!(state.get(), RunState::Cancelled);
}

#[test]
fn state_only_moves_forward() {
    let (ctl, _rx) = RunControl::new(CancelToken::new(), 1);
    ctl.enter(RunState::Rendering);
    ctl.enter(RunState::Decoding);
    assert_eq!(ctl.state(), RunState::Rendering);
    ctl.enter(RunState::Failed);
    ctl.enter(RunState::Cancelled);
    assert_eq!(ctl.state(), RunState::Failed);
    assert!(ctl.state().is_finished());
}

fn join_within(worker: std::thread::JoinHandle<()>, limit: std::time::Duration) {
    let start = std::time::Instant::now();
    while !worker.is_finished() {
        assert!(start.elapsed() < limit, "finish did not return");
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    worker.join().unwrap();
}

#[test]
fn terminal_message_waits_for_room_in_full_channel() {
    let (ctl, rx) = RunControl::new(CancelToken::new(), 1);
    let state = ctl.state_cell();
    ctl.progress(Phase::Frames, 40);
    let worker = std::thread::spawn(move || ctl.finish(Ok(vec![9])));
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert!(!worker.is_finished());

    assert_eq!(
        rx.recv().unwrap(),
        Message::Progress {
            phase: Phase::Frames,
            pct: 40
        }
    );
    assert_eq!(rx.recv().unwrap(), Message::Done { buffer: vec![9] });
    join_within(worker, std::time::Duration::from_secs(5));
    assert!(rx.recv().is_err());
    assert_eq!(state.get(), RunState::Done);
}

#[test]
fn cancel_releases_blocked_terminal_delivery() {
    let cancel = CancelToken::new();
    let (ctl, rx) = RunControl::new(cancel.clone(), 1);
    let state = ctl.state_cell();
    ctl.progress(Phase::Encode, 90);
    let worker = std::thread::spawn(move || ctl.finish(Err(SeewavError::encode("late failure"))));
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert!(!worker.is_finished());

    cancel.cancel();
    join_within(worker, std::time::Duration::from_secs(5));
    assert_eq!(state.get(), RunState::Cancelled);
    assert_eq!(
        rx.recv().unwrap(),
        Message::Progress {
            phase: Phase::Encode,
            pct: 90
        }
    );
    assert!(rx.recv().is_err());
}
