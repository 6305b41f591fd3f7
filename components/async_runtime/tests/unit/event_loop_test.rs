//! Unit tests for EventLoop

use async_runtime::{EventLoop, Task, Turn};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn new_event_loop_has_empty_task_queue() {
    let event_loop = EventLoop::<Vec<u32>>::new();
    assert!(event_loop.is_task_queue_empty());
    assert_eq!(event_loop.pending_timers(), 0);
}

#[test]
fn task_queue_fifo_order() {
    let event_loop = EventLoop::new();
    event_loop.enqueue_task(Task::new(|v: &mut Vec<u32>| v.push(1)));
    event_loop.enqueue_task(Task::new(|v: &mut Vec<u32>| v.push(2)));
    event_loop.enqueue_task(Task::new(|v: &mut Vec<u32>| v.push(3)));

    let mut out = Vec::new();
    while event_loop.turn(&mut out, None) == Turn::Ran {}
    assert_eq!(out, vec![1, 2, 3]);
}

#[test]
fn timers_fire_in_deadline_order() {
    let event_loop = EventLoop::new();
    event_loop.set_timer(Duration::from_millis(20), Task::new(|v: &mut Vec<u32>| v.push(20)));
    event_loop.set_timer(Duration::from_millis(5), Task::new(|v: &mut Vec<u32>| v.push(5)));

    let mut out = Vec::new();
    while event_loop.turn(&mut out, None) == Turn::Ran {}
    assert_eq!(out, vec![5, 20]);
}

#[test]
fn timer_does_not_fire_early() {
    let event_loop = EventLoop::new();
    let start = Instant::now();
    event_loop.set_timer(Duration::from_millis(15), Task::new(|_: &mut ()| {}));

    assert_eq!(event_loop.turn(&mut (), None), Turn::Ran);
    assert!(start.elapsed() >= Duration::from_millis(15));
}

#[test]
fn task_can_schedule_more_tasks() {
    use std::rc::Rc;

    struct Cx {
        event_loop: Rc<EventLoop<Cx>>,
        seen: Vec<&'static str>,
    }

    let event_loop = Rc::new(EventLoop::new());
    let mut cx = Cx {
        event_loop: Rc::clone(&event_loop),
        seen: Vec::new(),
    };
    event_loop.enqueue_task(Task::new(|cx: &mut Cx| {
        cx.seen.push("outer");
        cx.event_loop
            .enqueue_task(Task::new(|cx: &mut Cx| cx.seen.push("inner")));
    }));

    while event_loop.turn(&mut cx, None) == Turn::Ran {}
    assert_eq!(cx.seen, vec!["outer", "inner"]);
}

#[test]
fn deadline_bounds_the_wait() {
    let event_loop = EventLoop::<()>::new();
    let _held = event_loop.remote();

    let start = Instant::now();
    let turn = event_loop.turn(&mut (), Some(Instant::now() + Duration::from_millis(20)));
    assert_eq!(turn, Turn::TimedOut);
    assert!(start.elapsed() >= Duration::from_millis(20));
}

#[test]
fn remote_task_runs_on_loop_thread() {
    let event_loop = EventLoop::<Vec<thread::ThreadId>>::new();
    let handle = event_loop.remote();
    assert_eq!(event_loop.outstanding_remote(), 1);

    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(5));
        handle.send(|ids: &mut Vec<thread::ThreadId>| ids.push(thread::current().id()));
    });

    let mut ids = Vec::new();
    assert_eq!(event_loop.turn(&mut ids, None), Turn::Ran);
    worker.join().unwrap();

    assert_eq!(ids, vec![thread::current().id()]);
    assert_eq!(event_loop.outstanding_remote(), 0);
    assert_eq!(event_loop.turn(&mut ids, None), Turn::Idle);
}

#[test]
fn pop_ready_respects_now() {
    let event_loop = EventLoop::<()>::new();
    event_loop.set_timer(Duration::from_secs(60), Task::new(|_: &mut ()| {}));

    assert!(event_loop.pop_ready(Instant::now()).is_none());
    assert!(event_loop
        .pop_ready(Instant::now() + Duration::from_secs(61))
        .is_some());
}
