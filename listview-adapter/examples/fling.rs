use listview::{Component, ListItem, ListView, ListViewOptions, RenderObject, Size, ViewRegistry};
use listview_adapter::Controller;

#[derive(Default)]
struct Row;

impl RenderObject for Row {
    fn attach(&mut self) {}

    fn detach(&mut self) {}

    fn measure(&mut self, width: Option<f32>) -> Size {
        Size::new(width.unwrap_or(320.0), 48.0)
    }
}

impl Component<u64> for Row {
    fn set_inputs(&mut self, _inputs: &u64) {}
}

fn main() {
    // Example: a controller turning a quick upward swipe into momentum scrolling.
    //
    // An adapter would:
    // - forward pointer events with their timestamps
    // - call tick(now_ms) in a frame loop while is_flinging()
    // - apply list_view().scroll_offset() to the real scroll container (if any)
    let registry = ViewRegistry::new().with_component("row", Row::default);
    let mut view = ListView::new(registry, ListViewOptions::new());
    view.on_viewport_resize(Size::new(320.0, 640.0)).unwrap();
    view.set_items(
        (0..5_000u64)
            .map(|i| ListItem::component("row", i).with_id(i))
            .collect::<Vec<_>>(),
    )
    .unwrap();
    let mut c = Controller::new(view);

    c.on_pointer_down(0);
    for step in 1..=6u64 {
        c.on_drag(-40.0, step * 16).unwrap();
    }
    let flinging = c.on_release(96);
    println!("released at offset={} flinging={flinging}", c.list_view().scroll_offset());

    let mut now_ms = 96u64;
    while let Some(offset) = c.tick(now_ms).unwrap() {
        if now_ms % 160 == 0 {
            println!("t={now_ms} off={offset:.1} anchor={:?}", c.list_view().saved_scroll());
        }
        now_ms += 16;
    }

    println!(
        "done: off={:.1} anchor={:?}",
        c.list_view().scroll_offset(),
        c.list_view().saved_scroll()
    );
}
