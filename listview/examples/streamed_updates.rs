// Example: feeding a list view from an `ArrayDataSource` and watching the edits it computes.
use futures_core::Stream;
use listview::{
    ArrayDataSource, Component, ListItem, ListItemComparator, ListView, ListViewOptions,
    RenderObject, Size, Update, ViewRegistry,
};
use std::pin::Pin;
use std::task::{Context, Poll};

#[derive(Clone, Debug, PartialEq)]
struct Message {
    author: &'static str,
    body: String,
}

#[derive(Default)]
struct Bubble {
    lines: usize,
}

impl RenderObject for Bubble {
    fn attach(&mut self) {}

    fn detach(&mut self) {}

    fn measure(&mut self, _width: Option<f32>) -> Size {
        Size::new(320.0, 16.0 + 20.0 * self.lines as f32)
    }
}

impl Component<Message> for Bubble {
    fn set_inputs(&mut self, inputs: &Message) {
        self.lines = inputs.body.len() / 40 + 1;
    }
}

fn message(id: u64, author: &'static str, body: &str) -> ListItem<Message> {
    ListItem::component(
        "bubble",
        Message {
            author,
            body: body.to_string(),
        },
    )
    .with_id(id)
}

fn main() {
    let registry = ViewRegistry::new().with_component("bubble", Bubble::default);
    let mut view = ListView::new(registry, ListViewOptions::new());
    view.on_viewport_resize(Size::new(320.0, 600.0)).unwrap();

    let source = ArrayDataSource::with_comparator(ListItemComparator);
    let mut updates = source.observe();
    let mut cx = Context::from_waker(futures_task::noop_waker_ref());

    let mut thread: Vec<_> = (0..50)
        .map(|i| message(i, if i % 2 == 0 { "ann" } else { "bob" }, "hello"))
        .collect();

    let snapshots = [
        thread.clone(),
        {
            thread.push(message(50, "ann", "a long message that wraps onto a few lines"));
            thread.clone()
        },
        {
            thread.remove(3);
            thread[10] = message(10, "ann", "edited");
            thread.clone()
        },
    ];

    for snapshot in snapshots {
        source.set_items(snapshot);
        loop {
            match Pin::new(&mut updates).poll_next(&mut cx) {
                Poll::Ready(Some(Ok(update))) => {
                    match &update {
                        Update::Full { items } => println!("full: {} items", items.len()),
                        Update::Incremental { edits, .. } => {
                            let edits: Vec<_> = edits.iter().map(|e| e.to_string()).collect();
                            println!("incremental: {}", edits.join(", "));
                        }
                    }
                    view.apply_update(update).unwrap();
                    break;
                }
                Poll::Ready(Some(Err(err))) => panic!("{err}"),
                Poll::Ready(None) => return,
                Poll::Pending => {}
            }
        }
    }

    println!(
        "attached={:?} canvas_height={}",
        view.children().iter().map(|c| c.index()).collect::<Vec<_>>(),
        view.canvas_height()
    );
}
