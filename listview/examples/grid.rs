// Example: a photo grid whose column count follows the viewport width.
use listview::{
    GridLayout, ListItem, ListView, ListViewOptions, RenderObject, Size, Template, ViewRegistry,
};

#[derive(Clone, Debug, PartialEq)]
struct Photo {
    aspect_ratio: f32,
}

#[derive(Default)]
struct Thumbnail {
    aspect_ratio: f32,
}

impl RenderObject for Thumbnail {
    fn attach(&mut self) {}

    fn detach(&mut self) {}

    fn measure(&mut self, width: Option<f32>) -> Size {
        let width = width.unwrap_or(120.0);
        Size::new(width, width / self.aspect_ratio)
    }
}

impl Template<Photo> for Thumbnail {
    fn set_context(&mut self, context: &Photo) {
        self.aspect_ratio = context.aspect_ratio;
    }
}

fn main() {
    let registry = ViewRegistry::new().with_template("thumbnail", Thumbnail::default);
    let mut view = ListView::new(registry, ListViewOptions::new())
        .with_layout(GridLayout::new(160.0).with_gaps(8.0, 8.0));

    let photos: Vec<_> = (0..500u64)
        .map(|i| {
            let aspect_ratio = [1.0, 1.5, 0.75][(i % 3) as usize];
            ListItem::template("thumbnail", Photo { aspect_ratio }).with_id(i)
        })
        .collect();
    view.set_items(photos).unwrap();

    for width in [360.0, 720.0, 1280.0] {
        view.on_viewport_resize(Size::new(width, 800.0)).unwrap();
        let first = &view.children()[0];
        println!(
            "width={width} attached={} item_width={:.1} canvas_height={}",
            view.children().len(),
            first.width(),
            view.canvas_height()
        );
    }
}
