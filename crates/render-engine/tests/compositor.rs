use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use image::{Rgba, RgbaImage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use rankcast_common::error::{RankcastError, RankcastResult};
use rankcast_leaderboard_model::{ScoredMember, Standings};
use rankcast_render_engine::layout::{self, Layout};
use rankcast_render_engine::{
    load_font, AvatarSource, Background, BackgroundRotator, Captions, Compositor,
    CompositorSettings, HttpAvatarSource,
};

const AVATAR_RED: Rgba<u8> = Rgba([220, 20, 20, 255]);

fn font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/fonts/DejaVuSans.ttf")
}

fn settings(width: u32, height: u32, output: PathBuf) -> CompositorSettings {
    CompositorSettings {
        width,
        height,
        avatar_size: 32,
        output_path: output,
        captions: Captions {
            title: "Veckans topplista".to_string(),
            subtitle: "Återställs varje söndag".to_string(),
            footer: "Vill du vara med och tävla?".to_string(),
        },
    }
}

fn compositor(settings: CompositorSettings, avatars: Arc<dyn AvatarSource>) -> Compositor {
    let font = load_font(&font_path()).expect("font fixture");
    Compositor::new(settings, font, avatars)
}

fn solid_background(name: &str, width: u32, height: u32, color: [u8; 3]) -> Background {
    Background::new(
        name,
        RgbaImage::from_pixel(width, height, Rgba([color[0], color[1], color[2], 255])),
    )
}

fn scenario_standings() -> Standings {
    Standings::from_ranked(
        vec![
            (ScoredMember::new("p2", 900.0), "Bob".to_string()),
            (ScoredMember::new("p1", 500.0), "Alice".to_string()),
            (ScoredMember::new("p3", 100.0), "Cara".to_string()),
        ],
        3,
    )
}

/// Serves a solid red square for every name, counting requests.
#[derive(Default)]
struct StubAvatars {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl AvatarSource for StubAvatars {
    async fn fetch(&self, _name: &str, size: u32) -> RankcastResult<RgbaImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RgbaImage::from_pixel(size, size, AVATAR_RED))
    }
}

struct FailingAvatars;

#[async_trait::async_trait]
impl AvatarSource for FailingAvatars {
    async fn fetch(&self, name: &str, _size: u32) -> RankcastResult<RgbaImage> {
        Err(RankcastError::avatar_fetch(name, "HTTP 404 Not Found"))
    }
}

/// Minimal HTTP server answering every request with `status` and `body`.
async fn serve(status: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = Arc::new(body);
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let body = Arc::clone(&body);
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                while read < buf.len() {
                    match socket.read(&mut buf[read..]).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => read += n,
                    }
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn has_dark_pixel(image: &image::RgbImage, x0: u32, x1: u32, y0: u32, y1: u32) -> bool {
    (y0..y1).any(|y| (x0..x1).any(|x| image.get_pixel(x, y).0.iter().all(|c| *c < 60)))
}

#[tokio::test]
async fn rendering_twice_is_pixel_identical() {
    let dir = tempfile::tempdir().unwrap();
    let compositor = compositor(
        settings(1920, 1080, dir.path().join("leaderboard.png")),
        Arc::new(StubAvatars::default()),
    );
    let background = solid_background("bg.png", 1920, 1080, [30, 30, 60]);
    let standings = scenario_standings();

    let first = compositor.compose(&standings, &background).await.unwrap();
    let second = compositor.compose(&standings, &background).await.unwrap();
    assert!(first.image == second.image);
    assert_eq!(first.avatars_drawn, 3);
}

#[tokio::test]
async fn written_image_decodes_at_canvas_size() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("leaderboard.png");
    let compositor = compositor(
        settings(1920, 1080, output.clone()),
        Arc::new(StubAvatars::default()),
    );
    // A smaller background is stretched to the canvas.
    let background = solid_background("small.png", 640, 360, [10, 120, 10]);

    let report = compositor
        .render(&scenario_standings(), &background)
        .await
        .unwrap();
    assert_eq!(report.output_path, output);
    assert_eq!(report.background, "small.png");
    assert_eq!(report.rows, 3);

    let decoded = image::open(&output).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (1920, 1080));
    assert_eq!(decoded.get_pixel(5, 5).0, [10, 120, 10]);

    let stray: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .filter(|n| n != "leaderboard.png")
        .collect();
    assert!(stray.is_empty(), "unexpected files: {stray:?}");
}

#[tokio::test]
async fn avatars_are_drawn_inside_their_rows() {
    let dir = tempfile::tempdir().unwrap();
    let avatars = Arc::new(StubAvatars::default());
    let compositor = compositor(
        settings(1920, 1080, dir.path().join("leaderboard.png")),
        avatars.clone(),
    );
    let background = solid_background("bg.png", 1920, 1080, [0, 0, 0]);

    let composed = compositor
        .compose(&scenario_standings(), &background)
        .await
        .unwrap();
    let avatar = Layout::reference(3).avatar(0);
    let (cx, cy) = avatar.center();
    assert_eq!(*composed.image.get_pixel(cx as u32, cy as u32), AVATAR_RED);
    assert_eq!(avatars.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn avatar_404_still_renders_text_without_avatar() {
    let host = serve("404 Not Found", Vec::new()).await;
    let source = HttpAvatarSource::new(&host, Duration::from_secs(2)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("leaderboard.png");
    let compositor = compositor(settings(1920, 1080, output.clone()), Arc::new(source));
    let background = solid_background("bg.png", 1920, 1080, [255, 255, 255]);

    let report = compositor
        .render(&scenario_standings(), &background)
        .await
        .unwrap();
    assert_eq!(report.avatars_drawn, 0);
    assert_eq!(report.avatars_skipped, 3);

    let image = image::open(&output).unwrap().to_rgb8();
    let layout = Layout::reference(3);
    let avatar = layout.avatar(0);
    let (cx, cy) = avatar.center();
    // Where the avatar would be, the gold row shows through.
    let gold = layout::row_color(0);
    assert_eq!(
        image.get_pixel(cx as u32, cy as u32).0,
        [gold[0], gold[1], gold[2]]
    );

    // The row caption is drawn in black.
    let row = layout.row(0);
    assert!(has_dark_pixel(
        &image,
        (avatar.right() + 10) as u32,
        row.right() as u32,
        row.y as u32,
        row.bottom() as u32
    ));
}

#[tokio::test]
async fn http_avatar_source_decodes_images() {
    let avatar = RgbaImage::from_pixel(32, 32, AVATAR_RED);
    let host = serve("200 OK", png_bytes(&avatar)).await;
    let source = HttpAvatarSource::new(&host, Duration::from_secs(2)).unwrap();

    let fetched = source.fetch("Alice", 32).await.unwrap();
    assert_eq!(fetched.dimensions(), (32, 32));
    assert_eq!(*fetched.get_pixel(0, 0), AVATAR_RED);
}

#[tokio::test]
async fn http_avatar_source_rejects_garbage() {
    let host = serve("200 OK", b"<html>nope</html>".to_vec()).await;
    let source = HttpAvatarSource::new(&host, Duration::from_secs(2)).unwrap();
    let err = source.fetch("Alice", 32).await.unwrap_err();
    assert!(matches!(err, RankcastError::AvatarFetch { .. }));
}

#[tokio::test]
async fn failing_avatars_do_not_fail_the_render() {
    let dir = tempfile::tempdir().unwrap();
    let compositor = compositor(
        settings(480, 270, dir.path().join("leaderboard.png")),
        Arc::new(FailingAvatars),
    );
    let background = solid_background("bg.png", 480, 270, [0, 0, 0]);
    let report = compositor
        .render(&Standings::placeholders(3), &background)
        .await
        .unwrap();
    // All three placeholder rows share one name.
    assert_eq!(report.avatars_skipped, 3);
}

#[tokio::test]
async fn two_backgrounds_alternate_across_renders() {
    let dir = tempfile::tempdir().unwrap();
    let bg_dir = dir.path().join("bg");
    std::fs::create_dir(&bg_dir).unwrap();
    RgbaImage::from_pixel(48, 27, Rgba([200, 0, 0, 255]))
        .save(bg_dir.join("01.png"))
        .unwrap();
    RgbaImage::from_pixel(48, 27, Rgba([0, 0, 200, 255]))
        .save(bg_dir.join("02.png"))
        .unwrap();

    let rotator = BackgroundRotator::initialize(&bg_dir).unwrap();
    let output = dir.path().join("leaderboard.png");
    let compositor = compositor(
        settings(480, 270, output.clone()),
        Arc::new(FailingAvatars),
    );

    let mut used = Vec::new();
    let mut corners = Vec::new();
    for _ in 0..3 {
        let background = rotator.next().unwrap();
        let report = compositor
            .render(&scenario_standings(), &background)
            .await
            .unwrap();
        used.push(report.background);
        corners.push(image::open(&output).unwrap().to_rgb8().get_pixel(2, 2).0);
    }

    assert_eq!(used, vec!["01.png", "02.png", "01.png"]);
    assert_eq!(corners, vec![[200, 0, 0], [0, 0, 200], [200, 0, 0]]);
}

#[test]
fn scene_rows_match_standings_length() {
    let font = load_font(&font_path()).unwrap();
    let compositor = Compositor::new(
        settings(1920, 1080, PathBuf::from("unused.png")),
        font,
        Arc::new(FailingAvatars),
    );
    let scene = compositor.scene(&Standings::placeholders(5));
    assert_eq!(scene.avatar_names().count(), 5);
}
