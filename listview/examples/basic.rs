// Example: a list of 10k rows opened halfway down, with a logging render object.
use listview::{
    Component, ListItem, ListView, ListViewOptions, RenderObject, SavedScroll, Size, ViewRegistry,
};

#[derive(Default)]
struct Label {
    text: String,
}

impl RenderObject for Label {
    fn attach(&mut self) {
        println!("attach");
    }

    fn detach(&mut self) {
        println!("detach {}", self.text);
    }

    fn measure(&mut self, width: Option<f32>) -> Size {
        // one line of text, two for long labels
        let lines = if self.text.len() > 12 { 2.0 } else { 1.0 };
        Size::new(width.unwrap_or(320.0), 24.0 * lines)
    }
}

impl Component<String> for Label {
    fn set_inputs(&mut self, inputs: &String) {
        self.text.clone_from(inputs);
    }
}

fn main() {
    let registry = ViewRegistry::new().with_component("label", Label::default);
    let options = ListViewOptions::new()
        .with_buffer_size(100.0)
        .with_initial_scroll(Some(SavedScroll::new(5_000, 0.0)));
    let mut view = ListView::new(registry, options);

    let items: Vec<_> = (0..10_000u64)
        .map(|i| ListItem::component("label", format!("row {i}")).with_id(i))
        .collect();
    view.on_viewport_resize(Size::new(320.0, 480.0)).unwrap();
    view.set_items(items).unwrap();

    println!("opened at offset={}", view.scroll_offset());

    // the host scrolls down by a few rows
    view.on_scroll(view.scroll_offset() + 200.0).unwrap();
    println!("canvas_height={}", view.canvas_height());
    println!("scroll_offset={}", view.scroll_offset());
    println!("saved_scroll={:?}", view.saved_scroll());
    println!(
        "attached={:?}",
        view.children().iter().map(|c| c.index()).collect::<Vec<_>>()
    );
    println!("pooled={}", view.recycler().len());
}
