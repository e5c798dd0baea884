//! Tests for recognition priority, routing and the scene tracker

use super::*;
use crate::capture::{CaptureContext, Fingerprint, FrameContext, Point};
use image::Rgb;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

/// A (pixel (0,0) red) --click (1,1)--> B (pixel (0,0) blue)
fn red_blue_graph(settle: Duration) -> SceneGraph {
    let a = Scene::new("A", Recognizer::pixels(vec![Fingerprint::new(0, 0, RED)]))
        .way("B", Transition::click_at(Point::new(1, 1)).settle(settle));
    let b = Scene::new("B", Recognizer::pixels(vec![Fingerprint::new(0, 0, BLUE)]));
    let mut builder = SceneGraph::builder();
    builder.register(a).unwrap().register(b).unwrap();
    builder.build().unwrap()
}

fn frame(color: Rgb<u8>) -> (Arc<FrameContext>, Arc<dyn CaptureContext>) {
    let frame = Arc::new(FrameContext::solid(4, 4, color));
    let ctx: Arc<dyn CaptureContext> = frame.clone();
    (frame, ctx)
}

fn tracker_at(graph: &SceneGraph, name: &str) -> SceneTracker {
    let tracker = SceneTracker::new(graph.unknown());
    tracker.update(graph.get(name).unwrap());
    tracker
}

#[test]
fn test_specific_scene_registered_first_wins() {
    let popup = Scene::new(
        "Main.Popup",
        Recognizer::pixels(vec![
            Fingerprint::new(0, 0, RED),
            Fingerprint::new(1, 0, BLUE),
        ]),
    );
    let main = Scene::new("Main", Recognizer::pixels(vec![Fingerprint::new(0, 0, RED)]));
    let mut builder = SceneGraph::builder();
    builder.register(popup).unwrap().register(main).unwrap();
    let graph = builder.build().unwrap();

    let (frame, _) = frame(RED);
    assert_eq!(graph.recognize(frame.as_ref()).name(), "Main");

    frame.paint(|f| f.put_pixel(1, 0, BLUE)).unwrap();
    assert_eq!(graph.recognize(frame.as_ref()).name(), "Main.Popup");
}

#[test]
fn test_general_scene_registered_first_is_rejected() {
    let main = Scene::new("Main", Recognizer::pixels(vec![Fingerprint::new(0, 0, RED)]));
    let popup = Scene::new(
        "Main.Popup",
        Recognizer::pixels(vec![
            Fingerprint::new(0, 0, RED),
            Fingerprint::new(1, 0, BLUE),
        ]),
    );
    let mut builder = SceneGraph::builder();
    builder.register(main).unwrap().register(popup).unwrap();
    match builder.build() {
        Err(SceneError::ShadowedScene { earlier, later }) => {
            assert_eq!(earlier, "Main");
            assert_eq!(later, "Main.Popup");
        }
        other => panic!("Expected ShadowedScene, got {:?}", other.map(|g| g.names())),
    }
}

#[test]
fn test_disjoint_fingerprints_are_not_shadowed() {
    let left = Recognizer::pixels(vec![Fingerprint::new(0, 0, RED)]);
    let right = Recognizer::pixels(vec![Fingerprint::new(0, 0, BLUE)]);
    assert!(!left.shadows(&right));
    assert!(left.shadows(&left.clone().and(Recognizer::Never.negate())));
}

#[test]
fn test_unknown_when_nothing_matches() {
    let graph = red_blue_graph(Duration::ZERO);
    let (frame, _) = frame(GREEN);
    let scene = graph.recognize(frame.as_ref());
    assert!(scene.is_unknown());
    assert_eq!(graph.names().last(), Some(&UNKNOWN_SCENE));
}

#[test]
fn test_registration_errors() {
    let mut builder = SceneGraph::builder();
    builder
        .register(Scene::new("A", Recognizer::Never))
        .unwrap();
    assert!(matches!(
        builder.register(Scene::new("A", Recognizer::Never)),
        Err(SceneError::DuplicateScene { .. })
    ));
    assert!(matches!(
        builder.register(Scene::unknown()),
        Err(SceneError::DuplicateScene { .. })
    ));

    let mut builder = SceneGraph::builder();
    builder
        .register(
            Scene::new("A", Recognizer::Never).way("Nowhere", Transition::click_at(Point::new(0, 0))),
        )
        .unwrap();
    let err = builder.build().unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(err, SceneError::DanglingTransition { ref to, .. } if to == "Nowhere"));
}

#[test]
fn test_recognizer_combinators() {
    let (frame, _) = frame(RED);
    let red = Recognizer::pixels(vec![Fingerprint::new(0, 0, RED)]);
    let blue = Recognizer::pixels(vec![Fingerprint::new(0, 0, BLUE)]);

    assert!(red.matches(frame.as_ref()));
    assert!(!blue.matches(frame.as_ref()));
    assert!(blue.clone().negate().matches(frame.as_ref()));
    assert!(Recognizer::AnyOf(vec![blue.clone(), red.clone()]).matches(frame.as_ref()));
    assert!(!red.clone().and(blue).matches(frame.as_ref()));

    let near_red = Recognizer::pixels_with_tolerance(vec![Fingerprint::new(0, 0, Rgb([250, 4, 0]))], 5);
    assert!(near_red.matches(frame.as_ref()));

    let half = Recognizer::Fraction {
        points: vec![Fingerprint::new(0, 0, RED), Fingerprint::new(1, 1, GREEN)],
        tolerance: 0,
        min_ratio: 0.5,
    };
    assert!(half.matches(frame.as_ref()));

    // out of bounds samples count as a mismatch
    let off_screen = Recognizer::pixels(vec![Fingerprint::new(40, 40, RED)]);
    assert!(!off_screen.matches(frame.as_ref()));
}

#[test]
fn test_tracker_same_scene_is_noop() {
    let graph = red_blue_graph(Duration::ZERO);
    let tracker = SceneTracker::new(graph.unknown());

    assert!(tracker.update(graph.get("A").unwrap()));
    assert!(!tracker.update(graph.get("A").unwrap()));
    assert!(tracker.is_at("A"));
    assert!(tracker.previous().is_unknown());

    assert!(tracker.update(graph.get("B").unwrap()));
    let pair = tracker.pair();
    assert_eq!(pair.current.name(), "B");
    assert_eq!(pair.previous.name(), "A");
}

#[tokio::test]
async fn test_goto_end_to_end() {
    let graph = red_blue_graph(Duration::from_millis(100));
    let (frame, ctx) = frame(RED);
    frame.on_click(|_, f| f.put_pixel(0, 0, BLUE)).unwrap();
    let tracker = tracker_at(&graph, "A");

    let arrived = graph
        .goto(&ctx, &tracker, "B", &TransitionArgs::new())
        .await
        .unwrap();

    assert!(arrived);
    assert_eq!(tracker.current().name(), "B");
    assert_eq!(tracker.previous().name(), "A");
    assert_eq!(frame.clicks(), vec![Point::new(1, 1)]);
}

#[tokio::test]
async fn test_goto_skips_action_when_not_at_source() {
    let graph = red_blue_graph(Duration::ZERO);
    let (frame, ctx) = frame(GREEN);
    let tracker = tracker_at(&graph, "A");

    let arrived = graph
        .goto(&ctx, &tracker, "B", &TransitionArgs::new())
        .await
        .unwrap();

    assert!(!arrived);
    assert!(frame.clicks().is_empty(), "No input when the source scene is gone");
    assert_eq!(tracker.current().name(), "A");
}

#[tokio::test]
async fn test_goto_false_when_target_not_reached() {
    let graph = red_blue_graph(Duration::ZERO);
    let (frame, ctx) = frame(RED);
    let tracker = tracker_at(&graph, "A");

    let arrived = graph
        .goto(&ctx, &tracker, "B", &TransitionArgs::new())
        .await
        .unwrap();

    assert!(!arrived);
    assert_eq!(frame.clicks().len(), 1);
    assert_eq!(tracker.current().name(), "A");
}

#[tokio::test]
async fn test_goto_without_edge_is_unreachable() {
    let graph = red_blue_graph(Duration::ZERO);
    let (_frame, ctx) = frame(BLUE);
    let tracker = tracker_at(&graph, "B");

    let err = graph
        .goto(&ctx, &tracker, "A", &TransitionArgs::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SceneError::UnreachableTransition { ref from, ref to } if from == "B" && to == "A"
    ));

    let err = graph
        .goto(&ctx, &tracker, "Missing", &TransitionArgs::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SceneError::UnknownScene { .. }));
}

#[tokio::test]
async fn test_transition_arguments_reach_action() {
    let a = Scene::new("A", Recognizer::pixels(vec![Fingerprint::new(0, 0, RED)])).way(
        "B",
        Transition::new(Action::custom(|ctx, args| {
            let x: u32 = args
                .require("A", "x")?
                .parse()
                .map_err(|_| SceneError::InvalidArgument {
                    name: "x".to_string(),
                    value: args.get("x").unwrap_or_default().to_string(),
                })?;
            ctx.click(Point::new(x, 0))?;
            Ok(())
        })),
    );
    let b = Scene::new("B", Recognizer::pixels(vec![Fingerprint::new(0, 0, BLUE)]));
    let mut builder = SceneGraph::builder();
    builder.register(a).unwrap().register(b).unwrap();
    let graph = builder.build().unwrap();

    let (frame, ctx) = frame(RED);
    let tracker = tracker_at(&graph, "A");

    let err = graph
        .goto(&ctx, &tracker, "B", &TransitionArgs::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SceneError::MissingArgument { .. }));

    graph
        .goto(&ctx, &tracker, "B", &TransitionArgs::new().with("x", 3))
        .await
        .unwrap();
    assert_eq!(frame.clicks(), vec![Point::new(3, 0)]);
}

#[tokio::test]
async fn test_poller_tick_publishes_changes() {
    let graph = Arc::new(red_blue_graph(Duration::ZERO));
    let (frame, ctx) = frame(RED);
    let tracker = Arc::new(SceneTracker::new(graph.unknown()));
    let poller = ScenePoller::new(graph.clone(), ctx, tracker.clone());

    assert!(poller.tick().await.unwrap());
    assert!(tracker.is_at("A"));
    assert!(!poller.tick().await.unwrap(), "Same scene must not rotate the pair");

    frame.fill_rect(crate::capture::Rect::new(0, 0, 1, 1), BLUE).unwrap();
    assert!(poller.tick().await.unwrap());
    assert_eq!(tracker.previous().name(), "A");
    assert_eq!(tracker.current().name(), "B");
}

#[tokio::test]
async fn test_poller_worker_follows_screen() {
    let graph = Arc::new(red_blue_graph(Duration::ZERO));
    let (frame, ctx) = frame(RED);
    let tracker = Arc::new(SceneTracker::new(graph.unknown()));
    let worker = ScenePoller::new(graph, ctx, tracker.clone())
        .with_interval(Duration::from_millis(10))
        .start();

    let cancel = CancellationToken::new();
    let seen_a = tokio::time::timeout(Duration::from_secs(2), tracker.wait_for_scene("A", &cancel))
        .await
        .unwrap();
    assert!(seen_a);

    frame.fill_rect(crate::capture::Rect::new(0, 0, 1, 1), BLUE).unwrap();
    let seen_b = tokio::time::timeout(Duration::from_secs(2), tracker.wait_for_scene("B", &cancel))
        .await
        .unwrap();
    assert!(seen_b);

    worker.terminate();
    assert!(worker.token().is_cancelled());
    let joined = worker.join().await;
    assert!(joined.is_ok() || joined.is_err_and(|e| e.is_cancelled()));
}

#[tokio::test]
async fn test_wait_for_scene_cancelled() {
    let graph = red_blue_graph(Duration::ZERO);
    let tracker = SceneTracker::new(graph.unknown());
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(!tracker.wait_for_scene("B", &cancel).await);
}

#[test]
fn test_scene_memo() {
    let scene = Scene::new("Chapter", Recognizer::Never);
    assert_eq!(scene.recall("chapter"), None);
    scene.remember("chapter", 3);
    assert_eq!(scene.recall("chapter"), Some(3));
    scene.forget("chapter");
    assert_eq!(scene.recall("chapter"), None);
}

/// Black 6x6 field with a white diagonal and a white center dot
fn patch() -> image::RgbImage {
    image::RgbImage::from_fn(6, 6, |x, y| {
        if x == y || (x == 4 && y == 1) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

fn plant(frame: &FrameContext, template: &image::RgbImage, left: u32, top: u32) {
    frame
        .paint(|f| image::imageops::replace(f, template, i64::from(left), i64::from(top)))
        .unwrap();
}

#[test]
fn test_template_recognizer_matches_planted_patch() {
    let gray = Rgb([128, 128, 128]);
    let template = Arc::new(patch());
    let search = crate::capture::Rect::new(10, 10, 16, 16);
    let recognizer = Recognizer::template(search, template.clone(), 0.8);

    let frame = FrameContext::solid(40, 40, gray);
    assert!(!recognizer.matches(&frame), "A flat field is not the patch");

    plant(&frame, &template, 14, 13);
    assert!(recognizer.matches(&frame));

    // same patch moved outside the search area
    let shifted = FrameContext::solid(40, 40, gray);
    plant(&shifted, &template, 30, 30);
    assert!(!recognizer.matches(&shifted));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_poller_and_goto_never_tear_the_pair() {
    // A red, B blue, C green; only C -> B is an edge
    let mut builder = SceneGraph::builder();
    builder
        .register(Scene::new("A", Recognizer::pixels(vec![Fingerprint::new(0, 0, RED)])))
        .unwrap()
        .register(Scene::new("B", Recognizer::pixels(vec![Fingerprint::new(0, 0, BLUE)])))
        .unwrap()
        .register(
            Scene::new("C", Recognizer::pixels(vec![Fingerprint::new(0, 0, GREEN)]))
                .way("B", Transition::click_at(Point::new(1, 1))),
        )
        .unwrap();
    let graph = Arc::new(builder.build().unwrap());
    let (frame, ctx) = frame(GREEN);
    frame.on_click(|_, f| f.put_pixel(0, 0, BLUE)).unwrap();
    let tracker = Arc::new(SceneTracker::new(graph.unknown()));
    let poller = ScenePoller::new(graph.clone(), ctx.clone(), tracker.clone());
    let (a, c) = (graph.get("A").unwrap(), graph.get("C").unwrap());

    for _ in 0..25 {
        frame.fill_rect(crate::capture::Rect::new(0, 0, 1, 1), GREEN).unwrap();
        tracker.publish_transition(graph.unknown(), a.clone());

        let args = TransitionArgs::new();
        let (ticked, arrived) = tokio::join!(
            poller.tick(),
            graph.goto_from(&ctx, &tracker, c.clone(), "B", &args)
        );
        ticked.unwrap();
        assert!(arrived.unwrap());

        // the goto's pair, or a poller rotation applied on top of it
        let pair = tracker.pair();
        let names = (pair.previous.name(), pair.current.name());
        assert!(
            matches!(names, ("C", "B") | ("B", "C")),
            "torn scene pair {names:?}"
        );
    }
}

#[test]
fn test_graph_debug_lists_scenes() {
    let graph = red_blue_graph(Duration::ZERO);
    let shown = format!("{graph:?}");
    assert!(shown.starts_with("SceneGraph"));
    assert!(shown.contains("\"A\"") && shown.contains("\"B\""));
}
