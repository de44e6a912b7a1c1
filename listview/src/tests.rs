use crate::list_view::Window;
use crate::*;

use alloc::rc::Rc;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use core::cell::RefCell;
use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::task::{Context, Poll};

use futures_core::Stream;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as usize
    }

    fn gen_ratio(&mut self, numerator: u64, denominator: u64) -> bool {
        self.next_u64() % denominator < numerator
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Entry {
    id: u32,
    rev: u32,
}

#[derive(Clone, Copy, Debug, Default)]
struct EntryComparator;

impl ItemComparator<Entry> for EntryComparator {
    fn same_item(&self, old: &Entry, new: &Entry) -> bool {
        old.id == new.id
    }

    fn same_contents(&self, old: &Entry, new: &Entry) -> bool {
        old.rev == new.rev
    }
}

fn entries(ids: &[u32]) -> Vec<Entry> {
    ids.iter().map(|&id| Entry { id, rev: 0 }).collect()
}

fn diff_entries(old: &[Entry], new: &[Entry], detect_moves: bool) -> Diff {
    diff_with(SliceCallback::new(old, new, EntryComparator), detect_moves).unwrap()
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Slot {
    Old { index: usize, changed: bool },
    Inserted,
}

/// Applies `edits` to a model of `old` and checks that it now lines up with `new`.
fn assert_round_trip(old: &[Entry], new: &[Entry], diff: &Diff, detect_moves: bool) {
    let edits = diff.edits();
    let mut list: Vec<Slot> = (0..old.len())
        .map(|index| Slot::Old {
            index,
            changed: false,
        })
        .collect();

    for edit in &edits {
        match *edit {
            Edit::Insert { position, count } => {
                assert!(position <= list.len(), "{edit} out of bounds");
                for _ in 0..count {
                    list.insert(position, Slot::Inserted);
                }
            }
            Edit::Remove { position, count } => {
                assert!(position + count <= list.len(), "{edit} out of bounds");
                list.drain(position..position + count);
            }
            Edit::Change { position, count } => {
                assert!(position + count <= list.len(), "{edit} out of bounds");
                for slot in &mut list[position..position + count] {
                    if let Slot::Old { changed, .. } = slot {
                        *changed = true;
                    }
                }
            }
            Edit::Move { from, to } => {
                let slot = list.remove(from);
                list.insert(to, slot);
            }
        }
    }

    assert_eq!(list.len(), new.len());
    for (position, slot) in list.iter().enumerate() {
        match *slot {
            Slot::Old { index, changed } => {
                assert_eq!(old[index].id, new[position].id, "identity at {position}");
                if old[index].rev != new[position].rev {
                    assert!(changed, "missing change at {position}");
                }
                assert_eq!(diff.old_position_to_new(index).unwrap(), Some(position));
            }
            Slot::Inserted => {
                assert_eq!(diff.new_position_to_old(position).unwrap(), None);
                // with move detection every surviving item is matched, even when it moved
                if detect_moves {
                    assert!(old.iter().all(|e| e.id != new[position].id));
                }
            }
        }
    }
}

fn random_lists(rng: &mut Lcg) -> (Vec<Entry>, Vec<Entry>) {
    let len = rng.gen_range_usize(0, 40);
    let old: Vec<Entry> = (0..len as u32).map(|id| Entry { id, rev: 0 }).collect();

    let mut new = Vec::new();
    let mut next_id = len as u32;
    for entry in &old {
        if rng.gen_ratio(1, 5) {
            continue;
        }
        if rng.gen_ratio(1, 6) {
            new.push(Entry { id: next_id, rev: 0 });
            next_id += 1;
        }
        let rev = if rng.gen_ratio(1, 5) { 1 } else { 0 };
        new.push(Entry { id: entry.id, rev });
    }
    for _ in 0..rng.gen_range_usize(0, 4) {
        new.push(Entry { id: next_id, rev: 0 });
        next_id += 1;
    }
    // shuffle a few items around
    for _ in 0..rng.gen_range_usize(0, 3) {
        if new.len() < 2 {
            break;
        }
        let from = rng.gen_range_usize(0, new.len());
        let to = rng.gen_range_usize(0, new.len());
        let entry = new.remove(from);
        new.insert(to, entry);
    }
    (old, new)
}

#[test]
fn edits_reconstruct_new_list_randomized() {
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..300 {
        let (old, new) = random_lists(&mut rng);
        for detect_moves in [true, false] {
            let diff = diff_entries(&old, &new, detect_moves);
            if !detect_moves {
                assert!(!diff.edits().iter().any(|e| matches!(e, Edit::Move { .. })));
            }
            assert_round_trip(&old, &new, &diff, detect_moves);
        }
    }
}

#[test]
fn position_maps_are_inverse() {
    let mut rng = Lcg::new(42);
    for _ in 0..200 {
        let (old, new) = random_lists(&mut rng);
        let diff = diff_entries(&old, &new, true);
        for i in 0..old.len() {
            if let Some(j) = diff.old_position_to_new(i).unwrap() {
                assert_eq!(diff.new_position_to_old(j).unwrap(), Some(i));
            }
        }
        for j in 0..new.len() {
            if let Some(i) = diff.new_position_to_old(j).unwrap() {
                assert_eq!(diff.old_position_to_new(i).unwrap(), Some(j));
            }
        }
    }
}

#[test]
fn identical_lists_have_no_edits() {
    let list = entries(&[3, 1, 4, 1, 5, 9, 2, 6]);
    let diff = diff_entries(&list, &list.clone(), true);
    assert!(diff.edits().is_empty());

    let empty: Vec<Entry> = Vec::new();
    assert!(diff_entries(&empty, &empty, true).edits().is_empty());
}

#[test]
fn diff_is_deterministic() {
    let mut rng = Lcg::new(7);
    for _ in 0..50 {
        let (old, new) = random_lists(&mut rng);
        let first = diff_entries(&old, &new, true).edits();
        let second = diff_entries(&old, &new, true).edits();
        assert_eq!(first, second);
    }
}

#[test]
fn removal_in_the_middle() {
    let old = ['A', 'B', 'C'];
    let new = ['A', 'C'];
    let diff = diff_with(SliceCallback::new(&old[..], &new[..], EqComparator), true).unwrap();
    assert_eq!(diff.edits(), vec![Edit::Remove { position: 1, count: 1 }]);
}

#[test]
fn swap_is_a_single_move() {
    let old = ['A', 'B'];
    let new = ['B', 'A'];
    let diff = diff_with(SliceCallback::new(&old[..], &new[..], EqComparator), true).unwrap();
    let edits = diff.edits();
    assert_eq!(edits.len(), 1);
    assert!(matches!(edits[0], Edit::Move { .. }));

    // without move detection it degrades to a removal and an insertion
    let diff = diff_with(SliceCallback::new(&old[..], &new[..], EqComparator), false).unwrap();
    let edits = diff.edits();
    assert_eq!(edits.len(), 2);
    assert!(edits.iter().any(|e| matches!(e, Edit::Insert { count: 1, .. })));
    assert!(edits.iter().any(|e| matches!(e, Edit::Remove { count: 1, .. })));
}

#[test]
fn fill_from_empty() {
    let new = ['X', 'Y', 'Z'];
    let diff = diff(0, new.len(), |_, _| false, |_, _| true, true).unwrap();
    assert_eq!(diff.edits(), vec![Edit::Insert { position: 0, count: 3 }]);
}

#[test]
fn content_changes_are_reported_in_place() {
    let old = entries(&[1, 2, 3, 4]);
    let mut new = old.clone();
    new[1].rev = 1;
    new[2].rev = 1;
    let diff = diff_entries(&old, &new, true);
    assert_eq!(diff.edits(), vec![Edit::Change { position: 1, count: 2 }]);
}

#[test]
fn out_of_range_position_queries_fail() {
    let old = entries(&[1, 2, 3]);
    let new = entries(&[1, 3]);
    let diff = diff_entries(&old, &new, true);

    let err = diff.old_position_to_new(5).unwrap_err();
    assert_eq!(
        err,
        DiffError::OutOfBounds {
            side: ListSide::Old,
            position: 5,
            len: 3
        }
    );
    assert_eq!(
        err.to_string(),
        "index out of bounds - passed position = 5, old list size = 3"
    );
    assert!(matches!(
        diff.new_position_to_old(2),
        Err(DiffError::OutOfBounds {
            side: ListSide::New,
            ..
        })
    ));
    assert_eq!(diff.old_position_to_new(1).unwrap(), None);
}

#[test]
fn oversized_lists_are_rejected_before_searching() {
    let err = diff(diff::MAX_LIST_LEN + 1, 0, |_, _| false, |_, _| true, true).unwrap_err();
    assert_eq!(
        err,
        DiffError::TooLarge {
            len: diff::MAX_LIST_LEN + 1,
            max: diff::MAX_LIST_LEN
        }
    );
}

#[test]
fn batching_coalesces_adjacent_events() {
    let mut collector = EditCollector::default();
    {
        let mut batching = BatchingCallback::new(&mut collector);
        batching.on_removed(5, 1);
        batching.on_removed(4, 1);
        batching.on_removed(3, 1);
        batching.on_inserted(2, 1);
        batching.on_inserted(2, 1);
        batching.on_moved(0, 4);
        batching.on_moved(1, 4);
        batching.on_changed(7, 1);
        batching.on_changed(6, 1);
        batching.dispatch_last_event();
    }
    assert_eq!(
        collector.edits,
        vec![
            Edit::Remove { position: 3, count: 3 },
            Edit::Insert { position: 2, count: 2 },
            Edit::Move { from: 0, to: 4 },
            Edit::Move { from: 1, to: 4 },
            Edit::Change { position: 6, count: 2 },
        ]
    );
}

fn eager_yield() -> YieldBudget {
    let budget = YieldBudget::default().with_check_every(1);
    #[cfg(feature = "std")]
    let budget = budget.with_slice(core::time::Duration::ZERO);
    budget
}

fn reversed(len: u32) -> Vec<Entry> {
    (0..len).rev().map(|id| Entry { id, rev: 0 }).collect()
}

#[test]
fn yielding_task_matches_synchronous_diff() {
    let old = entries(&(0..30).collect::<Vec<_>>());
    let new = reversed(30);

    let expected = diff_entries(&old, &new, true).edits();

    let task = DiffTask::new(
        SliceCallback::new(&old[..], &new[..], EntryComparator),
        true,
        eager_yield(),
    );
    let diff = pollster::block_on(task).unwrap();
    assert_eq!(diff.edits(), expected);
}

#[test]
fn task_suspends_between_steps() {
    let old = entries(&(0..30).collect::<Vec<_>>());
    let new = reversed(30);
    let mut task = DiffTask::new(
        SliceCallback::new(&old[..], &new[..], EntryComparator),
        true,
        eager_yield(),
    );

    let mut cx = Context::from_waker(futures_task::noop_waker_ref());
    let mut pending = 0;
    let diff = loop {
        match Pin::new(&mut task).poll(&mut cx) {
            Poll::Ready(result) => break result.unwrap(),
            Poll::Pending => pending += 1,
        }
    };
    assert!(pending > 0);
    assert_round_trip(&old, &new, &diff, true);
}

fn poll_stream<T>(stream: &mut UpdateStream<T>) -> Poll<Option<Result<Update<T>, StreamError>>> {
    let mut cx = Context::from_waker(futures_task::noop_waker_ref());
    Pin::new(stream).poll_next(&mut cx)
}

fn next_update<T>(stream: &mut UpdateStream<T>) -> Option<Result<Update<T>, StreamError>> {
    for _ in 0..10_000 {
        if let Poll::Ready(item) = poll_stream(stream) {
            return item;
        }
    }
    panic!("stream did not produce an update");
}

#[test]
fn stream_starts_with_full_update() {
    let source = ArrayDataSource::with_comparator(EqComparator);
    source.set_items(vec![1, 2, 3]);
    let mut stream = source.observe();

    match next_update(&mut stream) {
        Some(Ok(Update::Full { items })) => assert_eq!(&items[..], &[1, 2, 3]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(poll_stream(&mut stream).is_pending());

    source.set_items(vec![1, 3]);
    match next_update(&mut stream) {
        Some(Ok(Update::Incremental {
            items,
            previous,
            edits,
        })) => {
            assert_eq!(&items[..], &[1, 3]);
            assert_eq!(&previous[..], &[1, 2, 3]);
            assert_eq!(edits, vec![Edit::Remove { position: 1, count: 1 }]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn stream_without_comparator_only_emits_full_updates() {
    let source = ArrayDataSource::new();
    let mut stream = source.observe();

    assert!(matches!(next_update(&mut stream), Some(Ok(Update::Full { .. }))));

    let items: Arc<[i32]> = Arc::from(vec![7, 8]);
    source.set_items(Arc::clone(&items));
    match next_update(&mut stream) {
        Some(Ok(Update::Full { items: got })) => assert!(Arc::ptr_eq(&got, &items)),
        other => panic!("unexpected {other:?}"),
    }

    // the same snapshot again is not a change
    source.set_items(Arc::clone(&items));
    assert!(poll_stream(&mut stream).is_pending());
}

#[test]
fn stream_drops_superseded_diffs() {
    let source = ArrayDataSource::with_comparator(EntryComparator).with_budget(eager_yield());
    let original = entries(&(0..30).collect::<Vec<_>>());
    source.set_items(original.clone());
    let mut stream = source.observe();
    assert!(matches!(next_update(&mut stream), Some(Ok(Update::Full { .. }))));

    source.set_items(reversed(30));
    assert!(poll_stream(&mut stream).is_pending());
    assert_eq!(stream.pending_diffs(), 1);

    let mut latest = reversed(30);
    latest.swap(0, 29);
    source.set_items(latest.clone());

    match next_update(&mut stream) {
        Some(Ok(Update::Incremental {
            items, previous, ..
        })) => {
            assert_eq!(&items[..], &latest[..]);
            assert_eq!(&previous[..], &original[..]);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(stream.version(), 3);
    assert_eq!(stream.pending_diffs(), 0);
    assert!(poll_stream(&mut stream).is_pending());
}

#[test]
fn dropping_the_source_ends_the_stream() {
    let source = ArrayDataSource::with_comparator(EqComparator);
    source.set_items(vec![1]);
    let mut stream = source.observe();
    assert!(matches!(next_update(&mut stream), Some(Ok(Update::Full { .. }))));

    drop(source);
    assert!(matches!(poll_stream(&mut stream), Poll::Ready(None)));
    assert!(matches!(poll_stream(&mut stream), Poll::Ready(None)));
}

#[test]
fn observers_keep_their_own_versions() {
    let source = ArrayDataSource::with_comparator(EqComparator);
    source.set_items(vec![1, 2]);
    let mut early = source.observe();
    assert!(matches!(next_update(&mut early), Some(Ok(Update::Full { .. }))));

    source.set_items(vec![2]);
    let mut late = source.observe();
    match next_update(&mut late) {
        Some(Ok(Update::Full { items })) => assert_eq!(&items[..], &[2]),
        other => panic!("unexpected {other:?}"),
    }
    match next_update(&mut early) {
        Some(Ok(Update::Incremental { edits, .. })) => {
            assert_eq!(edits, vec![Edit::Remove { position: 0, count: 1 }])
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn failed_stream_is_finished() {
    let source = ArrayDataSource::with_comparator(EqComparator).with_budget(eager_yield());
    source.set_items(vec![1, 2, 3]);
    let mut stream = source.observe();
    assert!(matches!(next_update(&mut stream), Some(Ok(Update::Full { .. }))));

    source.set_items(vec![3, 2, 1]);
    let _ = poll_stream(&mut stream);
    let source_err = DiffError::TooLarge {
        len: usize::MAX,
        max: crate::diff::MAX_LIST_LEN,
    };
    let err = stream.fail(stream.version(), source_err.clone());
    assert_eq!(err, StreamError { version: 2, source: source_err });
    assert_eq!(err.to_string(), "update stream failed at version 2");
    assert_eq!(stream.pending_diffs(), 0);
    assert_eq!(source.waiting_observers(), 0);

    source.set_items(vec![4]);
    assert!(matches!(poll_stream(&mut stream), Poll::Ready(None)));
}

#[test]
fn dropped_streams_stop_waiting() {
    let source = ArrayDataSource::with_comparator(EqComparator);
    source.set_items(vec![1]);
    let mut kept = source.observe();
    let mut dropped = source.observe();
    assert!(matches!(next_update(&mut kept), Some(Ok(Update::Full { .. }))));
    assert!(matches!(next_update(&mut dropped), Some(Ok(Update::Full { .. }))));
    assert!(poll_stream(&mut kept).is_pending());
    assert!(poll_stream(&mut dropped).is_pending());
    // repeated polls reuse the observer's slot
    assert!(poll_stream(&mut kept).is_pending());
    assert_eq!(source.waiting_observers(), 2);

    drop(dropped);
    assert_eq!(source.waiting_observers(), 1);

    source.set_items(vec![1, 2]);
    assert_eq!(source.waiting_observers(), 0);
    match next_update(&mut kept) {
        Some(Ok(Update::Incremental { items, .. })) => assert_eq!(&items[..], &[1, 2]),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn list_items_get_positional_keys_from_the_source() {
    let source = ArrayDataSource::with_comparator(ListItemComparator);
    source.set_list_items(vec![
        ListItem::component("row", Row { id: 0, height: 10.0 }),
        ListItem::component("row", Row { id: 1, height: 10.0 }).with_id(7),
        ListItem::template("label", Row { id: 2, height: 10.0 }),
    ]);
    let keys: Vec<_> = source.items().iter().map(|item| item.key).collect();
    assert_eq!(keys, vec![ItemKey::Index(0), ItemKey::Id(7), ItemKey::Index(2)]);
}

#[test]
fn positional_identity_follows_the_index() {
    let mut old = vec![
        ListItem::component("row", 1),
        ListItem::component("row", 2).with_id(99),
    ];
    index_keys(&mut old);
    assert_eq!(old[0].key, ItemKey::Index(0));
    assert_eq!(old[1].key, ItemKey::Id(99));

    let mut new = vec![ListItem::component("row", 1).with_id(99), ListItem::component("row", 1)];
    index_keys(&mut new);

    let cmp = ListItemComparator;
    assert!(!cmp.same_item(&old[0], &new[1]));
    assert!(cmp.same_item(&old[1], &new[0]));
    assert!(!cmp.same_contents(&old[1], &new[0]));
    assert!(cmp.same_item(&old[0], &ListItem::component("row", 5).at_index(0)));
    assert!(!cmp.same_item(&old[0], &ListItem::template("row", 1).at_index(0)));
}

#[test]
fn output_handlers_compare_by_identity() {
    let handler: OutputHandler = Arc::new(|_: &dyn Any| {});
    let mut a = ListItem::component("row", 1);
    let mut b = ListItem::component("row", 1);
    for item in [&mut a, &mut b] {
        if let Binding::Component { outputs, .. } = &mut item.binding {
            outputs
                .get_or_insert_with(Outputs::new)
                .insert("selected".into(), Arc::clone(&handler));
        }
    }
    assert!(ListItemComparator.same_contents(&a, &b));

    let c = ListItem::component("row", 1).with_output("selected", |_| {});
    assert!(!ListItemComparator.same_contents(&a, &c));
}

// --- views -------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
struct Row {
    id: u64,
    height: f32,
}

#[derive(Debug, Default)]
struct Journal {
    created: usize,
    attached: usize,
    detached: usize,
    destroyed: usize,
    measured: usize,
    bound: Vec<u64>,
    placed: usize,
}

type SharedJournal = Rc<RefCell<Journal>>;

struct RowView {
    journal: SharedJournal,
    height: f32,
}

impl RowView {
    fn new(journal: &SharedJournal) -> Self {
        journal.borrow_mut().created += 1;
        Self {
            journal: Rc::clone(journal),
            height: 0.0,
        }
    }
}

impl RenderObject for RowView {
    fn attach(&mut self) {
        self.journal.borrow_mut().attached += 1;
    }

    fn detach(&mut self) {
        self.journal.borrow_mut().detached += 1;
    }

    fn measure(&mut self, width: Option<f32>) -> Size {
        self.journal.borrow_mut().measured += 1;
        Size::new(width.unwrap_or(320.0), self.height)
    }

    fn place(&mut self, _left: f32, _top: f32) {
        self.journal.borrow_mut().placed += 1;
    }

    fn destroy(&mut self) {
        self.journal.borrow_mut().destroyed += 1;
    }
}

impl Component<Row> for RowView {
    fn set_inputs(&mut self, inputs: &Row) {
        self.height = inputs.height;
        self.journal.borrow_mut().bound.push(inputs.id);
    }
}

impl Template<Row> for RowView {
    fn set_context(&mut self, context: &Row) {
        self.set_inputs(context);
    }
}

fn registry(journal: &SharedJournal) -> ViewRegistry<Row> {
    let components = Rc::clone(journal);
    let templates = Rc::clone(journal);
    ViewRegistry::new()
        .with_component("row", move || RowView::new(&components))
        .with_template("label", move || RowView::new(&templates))
}

fn row(id: u64, height: f32) -> ListItem<Row> {
    ListItem::component("row", Row { id, height }).with_id(id)
}

fn rows(count: u64, height: f32) -> Vec<ListItem<Row>> {
    (0..count).map(|id| row(id, height)).collect()
}

fn indexes(view: &ListView<Row>) -> Vec<usize> {
    view.children().iter().map(Child::index).collect()
}

fn approx(a: f32, b: f32) -> bool {
    let d = a - b;
    -0.01 < d && d < 0.01
}

#[test]
fn recycler_caps_each_pool() {
    let journal = SharedJournal::default();
    let mut recycler = ViewRecycler::new(registry(&journal), 2);
    let row_type = ViewType::component("row");

    let views: Vec<_> = (0..3).map(|_| recycler.get(&row_type).unwrap()).collect();
    assert_eq!(journal.borrow().created, 3);
    for view in views {
        recycler.cache(view);
    }
    assert_eq!(recycler.cached(&row_type), 2);
    assert_eq!(journal.borrow().destroyed, 1);

    let reused = recycler.get(&row_type).unwrap();
    assert_eq!(journal.borrow().created, 3);
    assert_eq!(reused.view_type(), &row_type);
    assert_eq!(recycler.cached(&row_type), 1);

    let label = recycler.get(&ViewType::template("label")).unwrap();
    recycler.cache(label);
    recycler.cache(reused);
    assert_eq!(recycler.len(), 3);

    recycler.destroy_all();
    assert!(recycler.is_empty());
    assert_eq!(journal.borrow().destroyed, 4);
}

#[test]
fn recycler_rejects_unknown_view_types() {
    let journal = SharedJournal::default();
    let mut recycler = ViewRecycler::new(registry(&journal), 2);
    let err = recycler.get(&ViewType::template("missing")).unwrap_err();
    assert_eq!(err, UnknownViewType(ViewType::template("missing")));
    assert_eq!(err.to_string(), "no view factory registered for template 'missing'");
}

fn list_view(journal: &SharedJournal, options: ListViewOptions) -> ListView<Row> {
    ListView::new(registry(journal), options)
}

#[test]
fn anchored_first_pass_fills_around_the_anchor() {
    let journal = SharedJournal::default();
    let mut view = list_view(
        &journal,
        ListViewOptions::new()
            .with_buffer_size(200.0)
            .with_initial_scroll(Some(SavedScroll::new(5, 120.0))),
    );

    view.set_items(rows(100, 100.0)).unwrap();
    assert_eq!(view.layout_passes(), 0);

    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    assert_eq!(view.layout_passes(), 1);

    // forward: 5..=10, 10 starts at 620 and the next top (720) is past 700
    // backward: 4 down to 1, whose top (-280) is past -200
    assert_eq!(indexes(&view), (1..=10).collect::<Vec<_>>());

    // children started above the canvas, so everything moved down by 280
    assert_eq!(view.child(1).unwrap().top(), 0.0);
    assert_eq!(view.child(5).unwrap().top(), 400.0);
    assert_eq!(view.scroll_offset(), 280.0);
    // item 5 is still 120 below the top of the viewport
    assert_eq!(view.child(5).unwrap().top() - view.scroll_offset(), 120.0);
    assert_eq!(view.saved_scroll(), Some(SavedScroll::new(4, 20.0)));

    // estimate: bottom of child 10 plus 100 per remaining item
    assert_eq!(view.canvas_height(), 1000.0 + 100.0 * 91.0);
    assert_eq!(journal.borrow().attached, 10);
}

#[test]
fn linear_fill_stops_one_child_past_the_buffer() {
    let journal = SharedJournal::default();
    let mut window = Window::new(ViewRecycler::new(registry(&journal), 4), 64);
    window.set_items(rows(100, 100.0).into());

    let mut helper = LayoutHelper::new(
        &mut window,
        Size::new(320.0, 500.0),
        120.0,
        200.0,
        64,
        SavedScroll::new(5, 120.0),
    );
    LinearLayout.layout(&mut helper).unwrap();

    // forward: 12 starts at 820, the next top (920) is past 120 + 500 + 200
    // backward: 3 starts at -80, the next top (-180) is past 120 - 200
    let placed: Vec<_> = window.children().iter().map(|c| (c.index(), c.top())).collect();
    assert_eq!(placed.first(), Some(&(2, -180.0)));
    assert_eq!(placed.last(), Some(&(12, 820.0)));
    assert_eq!(placed.len(), 11);
}

#[test]
fn zero_height_viewport_skips_layout() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new());
    view.set_items(rows(10, 50.0)).unwrap();
    view.on_viewport_resize(Size::new(320.0, 0.0)).unwrap();
    assert_eq!(view.layout_passes(), 0);
    assert!(view.children().is_empty());

    view.on_viewport_resize(Size::new(320.0, 400.0)).unwrap();
    assert_eq!(view.layout_passes(), 1);
    assert!(!view.children().is_empty());
}

#[test]
fn canvas_is_exact_once_the_last_item_is_attached() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new());
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    assert_eq!(view.canvas_height(), 1000.0);

    view.set_items(rows(3, 100.0)).unwrap();
    assert_eq!(indexes(&view), vec![0, 1, 2]);
    assert_eq!(view.canvas_height(), 300.0);
}

#[test]
fn first_child_is_pulled_to_the_top() {
    let journal = SharedJournal::default();
    let mut view = list_view(
        &journal,
        ListViewOptions::new().with_initial_scroll(Some(SavedScroll::new(0, 50.0))),
    );
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(20, 100.0)).unwrap();

    assert_eq!(view.child(0).unwrap().top(), 0.0);
    assert_eq!(view.scroll_offset(), 0.0);
}

#[test]
fn resizes_in_one_tick_share_a_layout_pass() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new());
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(50, 100.0)).unwrap();
    let passes = view.layout_passes();

    assert!(view.child_resized(0, Size::new(320.0, 150.0)));
    assert!(view.child_resized(1, Size::new(320.0, 120.0)));
    assert!(view.child_resized(2, Size::new(320.0, 80.0)));
    // below the epsilon
    assert!(!view.child_resized(3, Size::new(320.0, 100.5)));
    assert!(view.child(0).unwrap().is_dirty());

    assert!(view.run_pending_layout().unwrap());
    assert!(!view.run_pending_layout().unwrap());
    assert_eq!(view.layout_passes(), passes + 1);

    assert_eq!(view.child(1).unwrap().top(), 150.0);
    assert_eq!(view.child(3).unwrap().top(), 350.0);
    assert!(!view.child(0).unwrap().is_dirty());

    let ran = view
        .resize_observed([(4, Size::new(320.0, 60.0)), (5, Size::new(320.0, 60.0))])
        .unwrap();
    assert!(ran);
    assert_eq!(view.layout_passes(), passes + 2);
    assert!(!view.resize_observed([(4, Size::new(320.0, 60.0))]).unwrap());
}

fn scrolled_view(journal: &SharedJournal) -> ListView<Row> {
    let mut view = list_view(journal, ListViewOptions::new().with_buffer_size(200.0));
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(100, 100.0)).unwrap();
    for step in 1..=10 {
        view.on_scroll(step as f32 * 100.0).unwrap();
    }
    view
}

#[test]
fn scrolling_moves_the_window() {
    let journal = SharedJournal::default();
    let view = scrolled_view(&journal);
    assert_eq!(view.scroll_offset(), 1000.0);
    assert_eq!(indexes(&view), (7..=17).collect::<Vec<_>>());
    assert_eq!(view.saved_scroll(), Some(SavedScroll::new(10, 0.0)));
    // views leaving the window went back to the pool and were reused
    assert!(journal.borrow().created < 20);
    assert!(journal.borrow().placed >= journal.borrow().attached);
}

#[test]
fn scrolling_past_the_window_resets_to_the_first_child() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new().with_buffer_size(200.0));
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(100, 100.0)).unwrap();

    view.on_scroll(5000.0).unwrap();
    assert_eq!(view.scroll_offset(), 0.0);
    assert_eq!(view.children()[0].index(), 0);
}

fn incremental(view: &ListView<Row>, items: Vec<ListItem<Row>>, edits: Vec<Edit>) -> Update<ListItem<Row>> {
    Update::Incremental {
        items: items.into(),
        previous: Arc::clone(view.items()),
        edits,
    }
}

fn id_at(view: &ListView<Row>, index: usize) -> u64 {
    view.items()[index].binding.payload().id
}

#[test]
fn insert_shifts_attached_children() {
    let journal = SharedJournal::default();
    let mut view = scrolled_view(&journal);
    let bound = journal.borrow().bound.len();

    let mut items: Vec<_> = view.items().to_vec();
    items.insert(0, row(1000, 100.0));
    items.insert(0, row(1001, 100.0));
    let update = incremental(&view, items, vec![Edit::Insert { position: 0, count: 2 }]);
    view.apply_update(update).unwrap();

    let child = view.child(12).unwrap();
    assert_eq!(child.top(), 1000.0);
    assert_eq!(id_at(&view, 12), 10);
    assert_eq!(view.saved_scroll(), Some(SavedScroll::new(12, 0.0)));
    assert_eq!(journal.borrow().bound.len(), bound);
}

#[test]
fn remove_recycles_and_shifts() {
    let journal = SharedJournal::default();
    let mut view = scrolled_view(&journal);

    let mut items: Vec<_> = view.items().to_vec();
    items.remove(12);
    let update = incremental(&view, items, vec![Edit::Remove { position: 12, count: 1 }]);
    view.apply_update(update).unwrap();

    assert_eq!(id_at(&view, 12), 13);
    assert_eq!(view.child(12).unwrap().top(), 1200.0);
    assert_eq!(view.child(10).unwrap().top(), 1000.0);
}

#[test]
fn change_rebinds_and_remeasures() {
    let journal = SharedJournal::default();
    let mut view = scrolled_view(&journal);
    let measured = journal.borrow().measured;

    let mut items: Vec<_> = view.items().to_vec();
    items[10] = row(10, 150.0);
    let update = incremental(&view, items, vec![Edit::Change { position: 10, count: 1 }]);
    view.apply_update(update).unwrap();

    assert_eq!(journal.borrow().bound.last(), Some(&10));
    assert_eq!(view.child(10).unwrap().height(), 150.0);
    assert_eq!(view.child(11).unwrap().top(), 1150.0);
    assert_eq!(view.child(10).unwrap().state(), ChildState::Measured);
    assert_eq!(journal.borrow().measured, measured + 1);
}

#[test]
fn move_falls_back_to_a_full_recycle_keeping_the_anchor() {
    let journal = SharedJournal::default();
    let mut view = scrolled_view(&journal);
    let detached = journal.borrow().detached;
    let attached = view.children().len();

    let mut items: Vec<_> = view.items().to_vec();
    let moved = items.remove(50);
    items.insert(0, moved);
    let update = incremental(&view, items, vec![Edit::Move { from: 50, to: 0 }]);
    view.apply_update(update).unwrap();

    assert_eq!(journal.borrow().detached, detached + attached);
    assert_eq!(view.scroll_offset(), 1000.0);
    assert_eq!(id_at(&view, 11), 10);
    assert_eq!(view.child(11).unwrap().top(), 1000.0);
    assert_eq!(view.saved_scroll(), Some(SavedScroll::new(11, 0.0)));
}

#[test]
fn incremental_update_on_empty_list_recycles_everything() {
    let journal = SharedJournal::default();
    let mut view = scrolled_view(&journal);

    let update = incremental(&view, Vec::new(), vec![Edit::Remove { position: 0, count: 100 }]);
    view.apply_update(update).unwrap();
    assert!(view.children().is_empty());
    assert_eq!(view.scroll_offset(), 0.0);
    assert_eq!(view.canvas_height(), 1000.0);
}

#[test]
fn full_update_rebinds_matching_view_types() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new());
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(10, 100.0)).unwrap();
    let created = journal.borrow().created;

    let mut items: Vec<_> = (0..10).map(|id| row(id + 100, 100.0)).collect();
    items[1] = ListItem::template("label", Row { id: 7, height: 40.0 });
    view.set_items(items).unwrap();

    // one view changed type: a label was created for it, every other row was rebound
    assert_eq!(journal.borrow().created, created + 1);
    assert_eq!(view.child(1).unwrap().view().view_type(), &ViewType::template("label"));
    assert_eq!(view.child(1).unwrap().height(), 40.0);
    assert_eq!(view.child(2).unwrap().top(), 140.0);
    assert_eq!(id_at(&view, 0), 100);
}

#[test]
fn unknown_template_fails_the_pass() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new());
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    let err = view
        .set_items(vec![ListItem::template("missing", Row { id: 0, height: 10.0 })])
        .unwrap_err();
    assert_eq!(
        err,
        LayoutError::UnknownViewType(UnknownViewType(ViewType::template("missing")))
    );
}

#[test]
fn scroll_changes_are_reported_once() {
    let journal = SharedJournal::default();
    let reports = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reports);
    let mut view = list_view(
        &journal,
        ListViewOptions::new().with_on_scroll_changed(Some(move |_: SavedScroll| {
            counter.fetch_add(1, Ordering::SeqCst);
        })),
    );
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(50, 100.0)).unwrap();
    assert_eq!(reports.load(Ordering::SeqCst), 1);

    view.relayout().unwrap();
    assert_eq!(reports.load(Ordering::SeqCst), 1);

    view.on_scroll(100.0).unwrap();
    assert_eq!(reports.load(Ordering::SeqCst), 2);
    assert_eq!(view.saved_scroll(), Some(SavedScroll::new(1, 0.0)));
}

#[test]
fn children_cap_limits_a_pass() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new().with_max_children_to_layout(4));
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(50, 10.0)).unwrap();
    assert_eq!(indexes(&view), vec![0, 1, 2, 3]);
}

#[test]
fn children_cap_also_bounds_the_backward_fill() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new().with_max_children_to_layout(4));
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(100, 100.0)).unwrap();
    for step in 1..=10 {
        view.on_scroll(step as f32 * 100.0).unwrap();
    }
    assert_eq!(view.scroll_offset(), 1000.0);
    assert_eq!(indexes(&view), vec![10, 11, 12, 13]);
}

#[test]
fn masonry_stops_at_the_children_cap() {
    let journal = SharedJournal::default();
    let mut window = Window::new(ViewRecycler::new(registry(&journal), 4), 3);
    window.set_items(rows(100, 100.0).into());

    let mut helper = LayoutHelper::new(
        &mut window,
        Size::new(200.0, 500.0),
        1000.0,
        200.0,
        3,
        SavedScroll::new(10, 1000.0),
    );
    MasonryLayout::new(2).layout(&mut helper).unwrap();

    let placed: Vec<_> = window.children().iter().map(|c| c.index()).collect();
    assert_eq!(placed, vec![10, 11, 12]);
}

#[test]
fn grid_layout_aligns_rows() {
    let grid = GridLayout::new(100.0).with_gaps(10.0, 10.0);
    assert_eq!(grid.column_count(320.0), 3);
    assert_eq!(grid.column_count(321.0), 4);
    assert_eq!(grid.column_count(0.0), 1);

    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new()).with_layout(grid);
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    view.set_items(rows(30, 100.0)).unwrap();

    let item_width = (320.0 - 40.0) / 3.0;
    for index in 0..3 {
        let child = view.child(index).unwrap();
        assert_eq!(child.top(), 0.0);
        assert!(approx(child.left(), 10.0 + index as f32 * (10.0 + item_width)));
        assert!(approx(child.width(), item_width));
    }
    assert_eq!(view.child(3).unwrap().top(), 110.0);
    assert!(approx(view.child(4).unwrap().left(), 20.0 + item_width));
}

#[test]
fn grid_layout_remeasures_on_width_change() {
    let journal = SharedJournal::default();
    let mut view =
        list_view(&journal, ListViewOptions::new()).with_layout(GridLayout::new(200.0));
    view.on_viewport_resize(Size::new(400.0, 500.0)).unwrap();
    view.set_items(rows(10, 100.0)).unwrap();
    assert!(approx(view.child(0).unwrap().width(), 200.0));

    view.on_viewport_resize(Size::new(300.0, 500.0)).unwrap();
    assert!(approx(view.child(0).unwrap().width(), 150.0));
}

#[test]
fn masonry_layout_fills_the_shortest_column() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new()).with_layout(MasonryLayout::new(2));
    view.on_viewport_resize(Size::new(200.0, 500.0)).unwrap();
    view.set_items(vec![row(0, 100.0), row(1, 50.0), row(2, 80.0), row(3, 60.0)])
        .unwrap();

    let at = |index: usize| {
        let child = view.child(index).unwrap();
        (child.left(), child.top())
    };
    assert_eq!(at(0), (0.0, 0.0));
    assert_eq!(at(1), (100.0, 0.0));
    assert_eq!(at(2), (100.0, 50.0));
    assert_eq!(at(3), (0.0, 100.0));
}

fn past_the_end(helper: &mut LayoutHelper<'_, Row>) -> Result<(), LayoutError> {
    let count = helper.item_count;
    let child = helper.child(count)?;
    helper.layout_child(child, 0.0, 0.0);
    Ok(())
}

#[test]
fn custom_layout_functions_can_fail() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new()).with_layout(past_the_end);
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();
    let err = view.set_items(rows(3, 10.0)).unwrap_err();
    assert_eq!(err, LayoutError::ChildOutOfRange { index: 3, count: 3 });
}

#[test]
fn dispose_destroys_every_view() {
    let journal = SharedJournal::default();
    let mut view = scrolled_view(&journal);
    let created = journal.borrow().created;

    view.dispose();
    assert!(view.children().is_empty());
    assert!(view.recycler().is_empty());
    assert_eq!(journal.borrow().destroyed, created);

    // inert afterwards
    view.set_items(rows(5, 10.0)).unwrap();
    assert!(view.children().is_empty());

    drop(view);
    assert_eq!(journal.borrow().destroyed, created);
}

#[test]
fn stream_updates_drive_the_list_view() {
    let journal = SharedJournal::default();
    let mut view = list_view(&journal, ListViewOptions::new());
    view.on_viewport_resize(Size::new(320.0, 500.0)).unwrap();

    let source = ArrayDataSource::with_comparator(ListItemComparator);
    source.set_items(rows(20, 100.0));
    let mut stream = source.observe();

    let update = next_update(&mut stream).unwrap().unwrap();
    view.apply_update(update).unwrap();
    assert_eq!(indexes(&view), (0..=7).collect::<Vec<_>>());

    let mut items = rows(20, 100.0);
    items.remove(0);
    source.set_items(items);
    let update = next_update(&mut stream).unwrap().unwrap();
    assert!(!update.is_full());
    view.apply_update(update).unwrap();
    assert_eq!(id_at(&view, 0), 1);
    assert_eq!(view.child(0).unwrap().top(), 0.0);
}
