//! End-to-end editing scenarios driven through `EditorSession`.

use atelier_core::properties::Dimension;
use atelier_core::shapes::{Rectangle, Text};
use atelier_core::{
    Attribute, Background, DesignDocument, EditorConfig, EditorError, EditorEvent,
    EditorSession, HeadlessEngine, HistoryState, MemoryStore, PropertyPanel, ShapePreset,
    TextPreset, TextToggle, ZOrder, decode_image,
};
use kurbo::Point;
use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;

fn session() -> EditorSession<HeadlessEngine> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut session = EditorSession::new(
        HeadlessEngine::new(),
        EditorConfig::default(),
        Arc::new(MemoryStore::new()),
    );
    session.init().unwrap();
    session
}

fn rectangle_at(x: f64, y: f64) -> atelier_core::Shape {
    atelier_core::Shape::Rectangle(Rectangle::new(Point::new(x, y), 100.0, 60.0))
}

fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);
    loop {
        if let Poll::Ready(output) = f.as_mut().poll(&mut cx) {
            return output;
        }
    }
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 120, 40, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn test_undo_redo_inverse_law() {
    let mut session = session();
    let initial = session.serialize().unwrap();

    let rect = session.add_object(rectangle_at(10.0, 10.0)).unwrap();
    session.set_attribute(rect, "opacity", "0.4").unwrap();
    session.set_attribute(rect, "fill", "#10b981").unwrap();
    session.set_size(rect, Dimension::Width, 333.3).unwrap();
    session.apply_attribute(rect, Attribute::Rotation(45.5)).unwrap();
    let text = session.add_text_preset(TextPreset::Heading).unwrap();
    session.toggle_text_style(TextToggle::Italic).unwrap();
    session.reorder(text, ZOrder::Bottom).unwrap();
    session.add_shape_preset(ShapePreset::Star).unwrap();
    session.set_linear_gradient().unwrap();
    let n = 10;
    assert_eq!(session.history().len(), n + 1);

    let latest = session.serialize().unwrap();
    for _ in 0..n {
        assert!(session.undo().unwrap());
    }
    assert!(!session.undo().unwrap());
    assert_eq!(session.serialize().unwrap(), initial);
    assert_eq!(session.history().state(), HistoryState::AtEarliest);

    for _ in 0..n {
        assert!(session.redo().unwrap());
    }
    assert!(!session.redo().unwrap());
    assert_eq!(session.serialize().unwrap(), latest);
}

#[test]
fn test_history_cap() {
    let mut session = session();
    let rect = session.add_object(rectangle_at(0.0, 0.0)).unwrap();
    for i in 1..60 {
        session
            .apply_attribute(rect, Attribute::X(i as f64))
            .unwrap();
    }

    assert_eq!(session.history().len(), 50);
    assert_eq!(session.history().cursor(), Some(49));
    assert_eq!(session.history().state(), HistoryState::AtLatest);
    assert_eq!(
        session.history().current().unwrap().as_str(),
        session.serialize().unwrap()
    );

    // The oldest retained state is the undo floor
    let mut steps = 0;
    while session.undo().unwrap() {
        steps += 1;
    }
    assert_eq!(steps, 49);
    let x = session.document().unwrap().get_shape(rect).unwrap().position().x;
    assert_eq!(x, 10.0);
}

#[test]
fn test_paste_compounds_offset() {
    let mut session = session();
    let original = session.add_object(rectangle_at(100.0, 100.0)).unwrap();
    session.on_selection_changed([original]);
    assert_eq!(session.copy(), 1);

    let first = session.paste().unwrap();
    let second = session.paste().unwrap();
    let doc = session.document().unwrap();
    assert_eq!(doc.get_shape(first[0]).unwrap().position(), Point::new(120.0, 120.0));
    assert_eq!(doc.get_shape(second[0]).unwrap().position(), Point::new(140.0, 140.0));
    assert_ne!(first[0], second[0]);
    assert_ne!(first[0], original);

    // Pasted copies land on top and become the selection
    assert_eq!(doc.z_order().last(), Some(&second[0]));
    assert_eq!(session.selection().all(), &second[..]);

    // The source is untouched
    assert_eq!(doc.get_shape(original).unwrap().position(), Point::new(100.0, 100.0));
}

#[test]
fn test_resize_is_stable() {
    let mut session = session();
    let rect = session.add_object(rectangle_at(0.0, 0.0)).unwrap();
    let base = session.document().unwrap().get_shape(rect).unwrap().base_size();
    assert_eq!(base.width, 100.0);

    session.set_size(rect, Dimension::Width, 200.0).unwrap();
    session.set_size(rect, Dimension::Width, 37.3).unwrap();
    session.set_size(rect, Dimension::Width, 100.0).unwrap();

    let shape = session.document().unwrap().get_shape(rect).unwrap();
    assert_eq!(shape.placement().scale_x, 1.0);
    assert_eq!(shape.base_size(), base);
}

#[test]
fn test_deleting_selection_clears_panel() {
    let mut session = session();
    let rect = session.add_object(rectangle_at(0.0, 0.0)).unwrap();
    session.on_selection_changed([rect]);
    assert_eq!(session.property_panel().title(), "Rectangle");
    session.drain_events();

    assert_eq!(session.delete_selected().unwrap(), 1);
    assert!(session.selection().is_empty());
    assert_eq!(session.property_panel().title(), PropertyPanel::NO_SELECTION);
    assert!(session
        .drain_events()
        .contains(&EditorEvent::SelectionChanged(PropertyPanel::Empty)));
}

#[test]
fn test_removing_selected_object_by_id() {
    let mut session = session();
    let a = session.add_object(rectangle_at(0.0, 0.0)).unwrap();
    let b = session.add_object(rectangle_at(50.0, 0.0)).unwrap();
    session.on_selection_changed([a, b]);

    assert!(session.remove_object(a).unwrap());
    assert_eq!(session.selection().all(), &[b]);
    assert!(!session.remove_object(a).unwrap());
}

#[test]
fn test_serialization_round_trip() {
    let mut session = session();
    session.add_object(rectangle_at(5.0, 5.0)).unwrap();
    let mut text = Text::new(Point::new(40.0, 40.0), "Sale: 50% off".to_string());
    text.italic = true;
    session.add_object(atelier_core::Shape::Text(text)).unwrap();
    session.add_shape_preset(ShapePreset::Heart).unwrap();
    session.add_shape_preset(ShapePreset::Arrow).unwrap();
    session.set_radial_gradient().unwrap();

    let json = session.serialize().unwrap();
    let restored = DesignDocument::from_json(&json).unwrap();
    let original = session.document().unwrap();
    assert_eq!(restored.len(), original.len());
    assert_eq!(restored.z_order(), original.z_order());
    assert_eq!(&restored, original);

    let mut other = self::session();
    other.load_document(&json).unwrap();
    assert_eq!(other.document().unwrap(), original);
    assert!(!other.can_undo());
}

#[test]
fn test_background_exclusivity() {
    let mut session = session();
    session.set_linear_gradient().unwrap();
    assert!(matches!(
        session.document().unwrap().background,
        Background::Gradient(_)
    ));

    let decoded = block_on(decode_image(png_bytes(40, 30)));
    session.install_background_image(decoded).unwrap();

    let doc = session.document().unwrap();
    let Background::Image(image) = &doc.background else {
        panic!("expected an image background");
    };
    assert_eq!(image.scale_x, 800.0 / 40.0);
    assert_eq!(image.scale_y, 600.0 / 30.0);
    let json = session.serialize().unwrap();
    assert!(!json.contains("gradient"));

    // Undo brings the gradient back in full
    session.undo().unwrap();
    assert!(matches!(
        session.document().unwrap().background,
        Background::Gradient(_)
    ));
}

#[test]
fn test_image_upload_fits_half_canvas() {
    let mut session = session();
    let decoded = block_on(decode_image(png_bytes(1600, 400)));
    let id = session.install_image(decoded).unwrap();

    let shape = session.document().unwrap().get_shape(id).unwrap();
    let size = shape.rendered_size();
    assert!((size.width - 400.0).abs() < 1e-9);
    assert!((size.height - 100.0).abs() < 1e-9);
    let center = shape.bounds().center();
    assert!((center.x - 400.0).abs() < 1e-9);
    assert!((center.y - 300.0).abs() < 1e-9);
    assert_eq!(session.selection().active(), Some(id));
}

#[test]
fn test_malformed_document_leaves_state_intact() {
    let mut session = session();
    session.add_object(rectangle_at(0.0, 0.0)).unwrap();
    let before = session.serialize().unwrap();
    let history_len = session.history().len();
    session.drain_events();

    let result = session.load_document(r#"{"version":1,"objects":[{"Rectangle":"#);
    assert!(matches!(result, Err(EditorError::Document(_))));
    assert_eq!(session.serialize().unwrap(), before);
    assert_eq!(session.history().len(), history_len);
    let events = session.drain_events();
    assert!(matches!(events.as_slice(), [EditorEvent::Warning(_)]));

    let future = r#"{"version":99,"id":"x","width":10,"height":10,"background":{"type":"solid","color":{"r":0,"g":0,"b":0,"a":255}},"objects":[]}"#;
    assert!(session.load_document(future).is_err());
    assert_eq!(session.serialize().unwrap(), before);
}

#[test]
fn test_clear_resets_everything_but_history() {
    let mut session = session();
    session.add_object(rectangle_at(0.0, 0.0)).unwrap();
    session.set_radial_gradient().unwrap();
    session.clear().unwrap();

    let doc = session.document().unwrap();
    assert!(doc.is_empty());
    assert_eq!(doc.background, Background::default());

    session.undo().unwrap();
    assert_eq!(session.document().unwrap().len(), 1);
}

#[test]
fn test_cut_then_paste() {
    let mut session = session();
    let rect = session.add_object(rectangle_at(100.0, 100.0)).unwrap();
    session.on_selection_changed([rect]);

    assert_eq!(session.cut().unwrap(), 1);
    assert!(session.document().unwrap().is_empty());
    let pasted = session.paste().unwrap();
    assert_eq!(
        session.document().unwrap().get_shape(pasted[0]).unwrap().position(),
        Point::new(120.0, 120.0)
    );
}

#[test]
fn test_duplicate_keeps_clipboard() {
    let mut session = session();
    let rect = session.add_object(rectangle_at(10.0, 10.0)).unwrap();
    session.on_selection_changed([rect]);

    let copies = session.duplicate_selected().unwrap();
    assert_eq!(copies.len(), 1);
    assert_eq!(
        session.document().unwrap().get_shape(copies[0]).unwrap().position(),
        Point::new(30.0, 30.0)
    );
    assert!(session.clipboard().is_empty());
}

#[test]
fn test_reorder_selected_keeps_relative_order() {
    let mut session = session();
    let a = session.add_object(rectangle_at(0.0, 0.0)).unwrap();
    let b = session.add_object(rectangle_at(10.0, 0.0)).unwrap();
    let c = session.add_object(rectangle_at(20.0, 0.0)).unwrap();
    let d = session.add_object(rectangle_at(30.0, 0.0)).unwrap();
    session.on_selection_changed([c, a]);

    assert!(session.reorder_selected(ZOrder::Top).unwrap());
    assert_eq!(session.document().unwrap().z_order(), vec![b, d, a, c]);

    assert!(session.reorder_selected(ZOrder::Bottom).unwrap());
    assert_eq!(session.document().unwrap().z_order(), vec![a, c, b, d]);
}
