use listview::{Component, ListItem, ListView, ListViewOptions, RenderObject, Size, ViewRegistry};
use listview_adapter::{Controller, ScrollMemory};

#[derive(Default)]
struct Row;

impl RenderObject for Row {
    fn attach(&mut self) {}

    fn detach(&mut self) {}

    fn measure(&mut self, width: Option<f32>) -> Size {
        Size::new(width.unwrap_or(320.0), 72.0)
    }
}

impl Component<u64> for Row {
    fn set_inputs(&mut self, _inputs: &u64) {}
}

fn open_screen(memory: &ScrollMemory<&'static str>) -> Controller<u64> {
    let registry = ViewRegistry::new().with_component("row", Row::default);
    let options = ListViewOptions::new().with_initial_scroll(memory.restore(&"inbox"));
    let mut view = ListView::new(registry, options);
    view.on_viewport_resize(Size::new(320.0, 640.0)).unwrap();
    view.set_items(
        (0..1_000u64)
            .map(|i| ListItem::component("row", i).with_id(i))
            .collect::<Vec<_>>(),
    )
    .unwrap();
    Controller::new(view)
}

fn main() {
    // Example: a screen is torn down and recreated, and comes back at the same position.
    let mut memory = ScrollMemory::new();

    let mut screen = open_screen(&memory);
    screen.on_scroll(7_250.0).unwrap();
    screen.remember(&mut memory, "inbox");
    println!("left at {:?}", screen.list_view().saved_scroll());
    screen.dispose();

    // durable storage only sees the change once
    println!("persist: {:?}", memory.take_unpersisted());
    println!("persist again: {:?}", memory.take_unpersisted());

    let screen = open_screen(&memory);
    println!(
        "reopened at {:?} (offset {})",
        screen.list_view().saved_scroll(),
        screen.list_view().scroll_offset()
    );
}
