use crate::*;

use alloc::vec;
use alloc::vec::Vec;
use core::task::{Context, Poll};

use listview::{
    ArrayDataSource, Component, ListItem, ListItemComparator, ListView, ListViewOptions,
    RenderObject, SavedScroll, Size, ViewRegistry,
};

#[derive(Clone, Debug, PartialEq)]
struct Row {
    id: u64,
    height: f32,
}

#[derive(Default)]
struct RowView {
    height: f32,
}

impl RenderObject for RowView {
    fn attach(&mut self) {}

    fn detach(&mut self) {}

    fn measure(&mut self, width: Option<f32>) -> Size {
        Size::new(width.unwrap_or(320.0), self.height)
    }
}

impl Component<Row> for RowView {
    fn set_inputs(&mut self, inputs: &Row) {
        self.height = inputs.height;
    }
}

fn rows(count: u64) -> Vec<ListItem<Row>> {
    (0..count)
        .map(|id| ListItem::component("row", Row { id, height: 100.0 }).with_id(id))
        .collect()
}

fn controller(count: u64) -> Controller<Row> {
    let registry = ViewRegistry::new().with_component("row", RowView::default);
    let mut view = ListView::new(registry, ListViewOptions::new());
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(count)).unwrap();
    Controller::new(view)
}

#[test]
fn velocity_follows_steady_drags() {
    let mut tracker = VelocityTracker::new();
    tracker.record(0.0, 0);
    tracker.record(10.0, 10);
    tracker.record(10.0, 20);
    assert_eq!(tracker.velocity(20), 1.0);
    assert_eq!(tracker.velocity(20 + VelocityTracker::STALE_MS + 1), 0.0);
}

#[test]
fn velocity_restarts_after_a_pause() {
    let mut tracker = VelocityTracker::new();
    tracker.record(0.0, 0);
    tracker.record(10.0, 10);
    tracker.record(50.0, 300);
    assert_eq!(tracker.velocity(300), 0.0);
    tracker.record(20.0, 310);
    assert_eq!(tracker.velocity(310), 2.0);

    tracker.reset();
    assert_eq!(tracker, VelocityTracker::default());
}

#[test]
fn fling_decays_until_it_is_too_slow() {
    let mut fling = Fling::new(0.0, 1.0, 0)
        .with_decay(0.5)
        .with_min_velocity(0.1);
    assert!(!fling.is_done());

    // 1 + 0.5 + 0.25 + 0.125, then the velocity (0.0625) is below the minimum
    assert_eq!(fling.advance(10), 1.875);
    assert!(fling.is_done());
    assert_eq!(fling.advance(20), 1.875);
}

#[test]
fn fling_stops_at_its_bounds() {
    let mut fling = Fling::new(95.0, 2.0, 0)
        .with_decay(1.0)
        .with_bounds(0.0, 100.0);
    assert_eq!(fling.advance(5), 100.0);
    assert!(fling.is_done());

    let mut fling = Fling::new(5.0, -2.0, 0).with_decay(1.0);
    assert_eq!(fling.advance(5), 0.0);
    assert!(fling.is_done());
}

#[test]
fn fling_catches_up_in_bounded_steps() {
    let mut fling = Fling::new(0.0, 1.0, 0).with_decay(1.0);
    assert_eq!(fling.advance(1000), Fling::MAX_STEP_MS as f32);
    assert!(!fling.is_done());
    assert_eq!(fling.advance(1010), Fling::MAX_STEP_MS as f32 + 10.0);
}

#[test]
fn slow_flings_never_start() {
    assert!(Fling::new(0.0, Fling::DEFAULT_MIN_VELOCITY / 2.0, 0).is_done());
}

#[test]
fn scroll_memory_hands_out_changes_once() {
    let mut memory = ScrollMemory::new();
    assert!(memory.record("feed", SavedScroll::new(4, 20.0)));
    assert!(!memory.record("feed", SavedScroll::new(4, 20.0)));
    assert_eq!(memory.version(), 1);
    assert!(memory.has_unpersisted());

    assert_eq!(
        memory.take_unpersisted(),
        vec![("feed", SavedScroll::new(4, 20.0))]
    );
    assert!(!memory.has_unpersisted());
    assert!(memory.take_unpersisted().is_empty());

    assert!(memory.record("search", SavedScroll::new(1, 0.0)));
    assert!(memory.record("feed", SavedScroll::new(9, 0.0)));
    assert_eq!(
        memory.take_unpersisted(),
        vec![
            ("search", SavedScroll::new(1, 0.0)),
            ("feed", SavedScroll::new(9, 0.0)),
        ]
    );
    assert_eq!(memory.restore(&"feed"), Some(SavedScroll::new(9, 0.0)));
    assert_eq!(memory.len(), 2);

    assert_eq!(memory.forget(&"search"), Some(SavedScroll::new(1, 0.0)));
    assert_eq!(memory.restore(&"search"), None);
}

#[test]
fn persisted_positions_are_not_handed_out_again() {
    let mut memory = ScrollMemory::from_persisted([(7u32, SavedScroll::new(3, 10.0))]);
    assert_eq!(memory.restore(&7), Some(SavedScroll::new(3, 10.0)));
    assert!(!memory.has_unpersisted());
    assert!(memory.take_unpersisted().is_empty());
    assert!(!memory.record(7, SavedScroll::new(3, 10.0)));
}

#[test]
fn drag_moves_content_with_the_pointer() {
    let mut c = controller(100);
    c.on_pointer_down(0);
    assert!(c.is_dragging());
    assert_eq!(c.on_drag(-30.0, 10).unwrap(), 30.0);
    assert_eq!(c.on_drag(10.0, 20).unwrap(), 20.0);
    // cannot drag above the top
    assert_eq!(c.on_drag(100.0, 30).unwrap(), 0.0);
    assert!(!c.on_release(200));
    assert!(!c.is_dragging());
}

#[test]
fn release_starts_a_fling_that_runs_out() {
    let mut c = controller(100).with_decay(0.99);
    c.on_pointer_down(0);
    for step in 1..=5u64 {
        c.on_drag(-10.0, step * 10).unwrap();
    }
    assert_eq!(c.list_view().scroll_offset(), 50.0);

    assert!(c.on_release(50));
    assert!(c.is_flinging());

    let mut last = 50.0;
    let mut now_ms = 50;
    while c.is_flinging() {
        now_ms += 16;
        let offset = c.tick(now_ms).unwrap().unwrap();
        assert!(offset >= last);
        last = offset;
        assert!(now_ms < 10_000, "fling never stopped");
    }

    // an initial velocity of 1 per ms decaying by 1% per ms covers just under 100
    assert!(last > 140.0 && last < 155.0, "{last}");
    assert_eq!(c.tick(now_ms + 16).unwrap(), None);
}

#[test]
fn pointer_down_and_dispose_stop_a_fling() {
    let mut c = controller(100);
    c.on_pointer_down(0);
    c.on_drag(-20.0, 10).unwrap();
    c.on_drag(-20.0, 20).unwrap();
    assert!(c.on_release(20));

    c.on_pointer_down(30);
    assert!(!c.is_flinging());

    c.on_drag(-20.0, 40).unwrap();
    assert!(c.on_release(40));
    c.dispose();
    assert!(!c.is_flinging());
    assert!(c.list_view().is_disposed());
    assert!(c.list_view().children().is_empty());
}

#[test]
fn tick_runs_the_pending_layout() {
    let mut c = controller(10);
    let passes = c.list_view().layout_passes();
    assert!(c.list_view_mut().child_resized(0, Size::new(320.0, 40.0)));
    assert_eq!(c.tick(0).unwrap(), None);
    assert_eq!(c.list_view().layout_passes(), passes + 1);
    assert_eq!(c.list_view().child(1).unwrap().top(), 40.0);
}

#[test]
fn controller_pumps_the_update_stream() {
    let registry = ViewRegistry::new().with_component("row", RowView::default);
    let mut view = ListView::new(registry, ListViewOptions::new());
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    let mut c = Controller::new(view);

    let source = ArrayDataSource::with_comparator(ListItemComparator);
    source.set_items(rows(20));
    let mut updates = source.observe();
    let mut cx = Context::from_waker(futures_task::noop_waker_ref());

    assert!(c.poll_updates(&mut updates, &mut cx).is_pending());
    assert_eq!(c.list_view().items().len(), 20);
    assert_eq!(c.list_view().children().len(), 8);

    let mut items = rows(20);
    items.truncate(5);
    source.set_items(items);
    // diffs may need several polls before they complete
    for _ in 0..100 {
        assert!(c.poll_updates(&mut updates, &mut cx).is_pending());
        if c.list_view().items().len() == 5 {
            break;
        }
    }
    assert_eq!(c.list_view().items().len(), 5);
    assert_eq!(c.list_view().children().len(), 5);

    drop(source);
    assert!(matches!(
        c.poll_updates(&mut updates, &mut cx),
        Poll::Ready(Ok(()))
    ));
}

#[test]
fn controller_remembers_the_anchor() {
    let mut c = controller(100);
    c.on_scroll(300.0).unwrap();

    let mut memory = ScrollMemory::new();
    assert!(c.remember(&mut memory, "feed"));
    assert!(!c.remember(&mut memory, "feed"));
    assert_eq!(memory.restore(&"feed"), Some(SavedScroll::new(3, 0.0)));

    // a recreated screen starts where the old one was
    let registry = ViewRegistry::new().with_component("row", RowView::default);
    let options = ListViewOptions::new().with_initial_scroll(memory.restore(&"feed"));
    let mut view = ListView::new(registry, options);
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(100)).unwrap();
    assert_eq!(view.saved_scroll(), Some(SavedScroll::new(3, 0.0)));
    assert_eq!(view.scroll_offset(), 300.0);
}
