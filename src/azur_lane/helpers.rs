// Recognition and input helpers used by the Azur Lane tasks.
// Sync helpers run on the blocking pool (TaskContext::observe or a custom action).

use super::assets::{DutyPanel, EnemyScale, GameAssets};
use crate::capture::{CaptureContext, CaptureResult, Point, Rect};
use crate::scene::{Action, SceneResult, compare_with_pixels, compare_with_template};
use crate::task::{TaskContext, TaskError, TaskResult};
use crate::vision::{
    MatchConfig, TextError, TextRecognizer, combine_similar_points, create_ui_config,
    find_most_match, match_multi_template, unique_chars,
};
use image::{DynamicImage, GrayImage, Luma, RgbImage};
use std::sync::Arc;
use std::time::Duration;

pub const CHAPTER_NAMES: [(&str, u32); 13] = [
    ("虎!虎!虎!", 1),
    ("玻瑚海首秀", 2),
    ("決戰中途島", 3),
    ("所羅門的噩夢上", 4),
    ("所羅門的噩夢中", 5),
    ("所羅門的噩夢下", 6),
    ("混沌之夜", 7),
    ("科曼多爾海戰", 8),
    ("庫拉灣海戰", 9),
    ("科隆班加拉島夜戰", 10),
    ("奧古斯塔皇后灣海戰", 11),
    ("馬里亞納風雲上", 12),
    ("馬里亞納風雲下", 13),
];

// style-001 popup text -> code
pub const INFORMATION_PHRASES: [(&str, usize); 1] = [("檢測到船塢數據遺失是否重新讀取?", 0)];

pub const MEMO_CHAPTER: &str = "chapter";

const CHAPTER_RETRIES: u32 = 20;
const CHAPTER_RETRY_INTERVAL: Duration = Duration::from_millis(150);

/// Inverse binary threshold: bright text becomes black ink on white.
pub fn binarize(image: &RgbImage, thresh: u8) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > thresh {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

pub fn crop_to_ink(image: &GrayImage, margin: u32) -> GrayImage {
    let inked: Vec<u32> = (0..image.width())
        .filter(|&x| (0..image.height()).any(|y| image.get_pixel(x, y)[0] == 0))
        .collect();
    let (Some(&first), Some(&last)) = (inked.first(), inked.last()) else {
        return image.clone();
    };
    let left = first.saturating_sub(margin);
    let right = (last + 1 + margin).min(image.width());
    image::imageops::crop_imm(image, left, 0, right - left, image.height()).to_image()
}

/// Screenshot `rect`, clean it up and run OCR restricted to `charset`.
pub fn read_text(
    ctx: &dyn CaptureContext,
    text: &dyn TextRecognizer,
    rect: Rect,
    thresh: u8,
    charset: Option<&str>,
) -> TaskResult<String> {
    let shot = ctx.screenshot(rect)?;
    let cleaned = crop_to_ink(&binarize(&shot, thresh), 5);
    let rgb = DynamicImage::ImageLuma8(cleaned).to_rgb8();
    Ok(text.recognize_text(&rgb, charset)?.trim().to_string())
}

fn unrecognized(what: &str, raw: &str) -> TaskError {
    TaskError::Text {
        source: TextError::Failed {
            description: format!("unrecognized {what} '{raw}'"),
        },
    }
}

pub fn recognize_chapter_title(
    ctx: &dyn CaptureContext,
    text: &dyn TextRecognizer,
    assets: &GameAssets,
) -> TaskResult<u32> {
    let titles = CHAPTER_NAMES.iter().map(|(title, _)| *title);
    let charset = unique_chars(titles.clone());
    let raw = read_text(ctx, text, assets.chapter_title, 128, Some(&charset))?;
    let (title, _) = find_most_match(&raw, titles)
        .filter(|(_, score)| *score > 0.0)
        .ok_or_else(|| unrecognized("chapter title", &raw))?;
    CHAPTER_NAMES
        .iter()
        .find(|(known, _)| *known == title)
        .map(|(_, chapter)| *chapter)
        .ok_or_else(|| unrecognized("chapter title", &raw))
}

pub fn recognize_rescue_times(
    ctx: &dyn CaptureContext,
    text: &dyn TextRecognizer,
    assets: &GameAssets,
) -> TaskResult<u32> {
    let raw = read_text(ctx, text, assets.rescue_count, 128, Some("012345678"))?;
    raw.parse::<u32>()
        .map_err(|_| unrecognized("rescue count", &raw))
}

pub fn recognize_information_popup(
    ctx: &dyn CaptureContext,
    text: &dyn TextRecognizer,
    assets: &GameAssets,
) -> TaskResult<usize> {
    let phrases = INFORMATION_PHRASES.iter().map(|(phrase, _)| *phrase);
    let charset = unique_chars(phrases.clone());
    let raw = read_text(ctx, text, assets.information_text, 190, Some(&charset))?;
    let (phrase, _) = find_most_match(&raw, phrases)
        .filter(|(_, score)| *score > 0.0)
        .ok_or_else(|| unrecognized("popup text", &raw))?;
    INFORMATION_PHRASES
        .iter()
        .find(|(known, _)| *known == phrase)
        .map(|(_, code)| *code)
        .ok_or_else(|| unrecognized("popup text", &raw))
}

pub fn is_signal_found(ctx: &dyn CaptureContext, assets: &GameAssets) -> bool {
    compare_with_pixels(ctx, &assets.signal_found, 0)
}

/// The stage popup's automation switch is lit (red channel) when on.
pub fn is_stage_automation(ctx: &dyn CaptureContext, assets: &GameAssets) -> CaptureResult<bool> {
    let pixel = ctx.sample_pixel(assets.stage_automation.center())?;
    Ok(pixel[0] > 100)
}

pub fn set_stage_automation(
    ctx: &dyn CaptureContext,
    assets: &GameAssets,
    turn_on: bool,
) -> SceneResult<()> {
    if is_stage_automation(ctx, assets)? != turn_on {
        Action::Sequence(vec![
            Action::Click(assets.stage_automation),
            Action::Pause(Duration::from_secs(1)),
        ])
        .perform(ctx, &Default::default())?;
    }
    Ok(())
}

/// Pick fleets for both teams; numbers outside 1..=6 leave that team as it is.
pub fn choose_team(
    ctx: &dyn CaptureContext,
    assets: &GameAssets,
    team_one: u8,
    team_two: u8,
) -> SceneResult<()> {
    for (team, fleet) in [(0, team_one), (1, team_two)] {
        let Some(button) = assets.fleet_button(team, fleet) else {
            log::warn!("⚠️ No fleet {fleet} for team {}", team + 1);
            continue;
        };
        Action::Sequence(vec![
            Action::Click(assets.choose_team[team]),
            Action::Pause(Duration::from_millis(500)),
            Action::Click(button),
            Action::Pause(Duration::from_millis(if team == 0 { 500 } else { 1000 })),
        ])
        .perform(ctx, &Default::default())?;
    }
    Ok(())
}

/// Selected duties as a bit set.
///
/// Bit 0 submarine auto engage, bit 1 submarine stand by (only when exactly
/// one of the two is lit), bits 2..=5 normal fleet stand by, all battle,
/// flagship, normal battle. Zero means the duty panel is not showing.
pub fn show_duty(ctx: &dyn CaptureContext, duty: &DutyPanel) -> u8 {
    let [auto_engage, stand_by] = &duty.submarine;
    let mut duties = match (
        compare_with_pixels(ctx, &auto_engage.state, 0),
        compare_with_pixels(ctx, &stand_by.state, 0),
    ) {
        (true, false) => 0b01,
        (false, true) => 0b10,
        _ => 0,
    };
    for (idx, button) in duty.normal.iter().enumerate() {
        if compare_with_pixels(ctx, &button.state, 0) {
            duties |= 1 << (idx + 2);
        }
    }
    duties
}

// code is one of 0b0001..=0b1000
pub fn set_duty_marine(ctx: &dyn CaptureContext, assets: &GameAssets, code: u8) -> SceneResult<bool> {
    if !code.is_power_of_two() || code > 0b1000 {
        log::warn!("⚠️ Unknown duty code {code:#06b}");
        return Ok(false);
    }
    let button = &assets.duty.normal[code.trailing_zeros() as usize];
    Action::Sequence(vec![
        Action::Click(button.rect),
        Action::Pause(Duration::from_millis(750)),
    ])
    .perform(ctx, &Default::default())?;
    Ok(show_duty(ctx, &assets.duty) >> 2 == code)
}

/// State of the in-map auto search button, `None` when neither template shows.
pub fn campaign_automation(ctx: &dyn CaptureContext, assets: &GameAssets) -> Option<bool> {
    let toggle = &assets.campaign_automation;
    let threshold = create_ui_config().threshold;
    if compare_with_template(ctx, toggle.rect, &toggle.on, threshold) {
        Some(true)
    } else if compare_with_template(ctx, toggle.rect, &toggle.off, threshold) {
        Some(false)
    } else {
        None
    }
}

/// Switch the in-map auto search on when it shows off. Returns whether it clicked.
pub fn enable_campaign_automation(ctx: &dyn CaptureContext, assets: &GameAssets) -> SceneResult<bool> {
    if campaign_automation(ctx, assets) != Some(false) {
        return Ok(false);
    }
    Action::Sequence(vec![
        Action::Click(assets.campaign_automation.rect),
        Action::Pause(Duration::from_secs(1)),
    ])
    .perform(ctx, &Default::default())?;
    Ok(true)
}

pub fn has_new_notice(ctx: &dyn CaptureContext, assets: &GameAssets) -> bool {
    let notice = &assets.living_area_notice;
    compare_with_template(ctx, notice.rect, &notice.template, 0.8)
}

pub fn is_formation_automation(ctx: &dyn CaptureContext, assets: &GameAssets) -> bool {
    compare_with_pixels(ctx, &assets.formation_automation.state, 0)
}

pub fn set_formation_automation(
    ctx: &dyn CaptureContext,
    assets: &GameAssets,
    turn_on: bool,
) -> SceneResult<bool> {
    if is_formation_automation(ctx, assets) != turn_on {
        Action::Sequence(vec![
            Action::Click(assets.formation_automation.rect),
            Action::Pause(Duration::from_secs(1)),
        ])
        .perform(ctx, &Default::default())?;
    }
    Ok(is_formation_automation(ctx, assets) == turn_on)
}

pub fn detect_enemies(image: &RgbImage, templates: &[Arc<RgbImage>], config: &MatchConfig) -> Vec<Point> {
    let hits: Vec<Point> = templates
        .iter()
        .flat_map(|template| {
            match_multi_template(image, template, config.method, config.threshold, None)
        })
        .collect();
    if hits.is_empty() {
        return hits;
    }
    combine_similar_points(&hits, config.dedup_distance.unwrap_or(50.0))
}

/// Click target for the strongest enemy visible in any of `shots`.
pub fn pick_enemy(shots: &[RgbImage], assets: &GameAssets, config: &MatchConfig) -> Option<(EnemyScale, Point)> {
    for (scale, templates) in &assets.enemies {
        let mut found = Vec::new();
        for shot in shots {
            let hits = detect_enemies(shot, templates, config);
            let (dx, dy) = scale.click_offset(hits.len());
            found.extend(hits.iter().map(|p| p.offset(dx, dy)));
        }
        if found.is_empty() {
            continue;
        }
        let found = combine_similar_points(&found, config.dedup_distance.unwrap_or(50.0));
        log::debug!("🎯 {} {:?} enemies: {:?}", found.len(), scale, found);
        if let Some(target) = found.first() {
            return Some((*scale, *target));
        }
    }
    None
}

// two shots 1.5 s apart, enemies flicker behind map effects
pub async fn attack_enemies(cx: &TaskContext, assets: &GameAssets, config: &MatchConfig) -> TaskResult<bool> {
    let first = cx.observe(|ctx| ctx.full_screenshot()).await??;
    cx.sleep(Duration::from_millis(1500)).await?;
    let second = cx.observe(|ctx| ctx.full_screenshot()).await??;

    let Some((scale, target)) = pick_enemy(&[first, second], assets, config) else {
        log::info!("🔍 [{}] no enemy found", cx.name());
        return Ok(false);
    };
    log::info!("⚔️ [{}] attacking {:?} fleet at {target}", cx.name(), scale);
    cx.perform(Action::Sequence(vec![
        Action::ClickAt(target),
        Action::Pause(Duration::from_secs(1)),
    ]))
    .await?;
    Ok(true)
}

/// Recognize the current chapter and page towards `target`, returning the chapter seen first.
pub async fn switch_to_chapter(cx: &TaskContext, assets: &Arc<GameAssets>, target: u32) -> TaskResult<u32> {
    let text = cx.text_recognizer().clone();
    let title_assets = assets.clone();
    let current = cx
        .retry(
            "chapter title",
            CHAPTER_RETRIES,
            CHAPTER_RETRY_INTERVAL,
            move |ctx| recognize_chapter_title(ctx, text.as_ref(), &title_assets),
        )
        .await?;
    cx.scene_cur().remember(MEMO_CHAPTER, i64::from(current));

    let delta = i64::from(target) - i64::from(current);
    if delta != 0 {
        let button = if delta > 0 {
            assets.next_chapter
        } else {
            assets.prev_chapter
        };
        log::info!("📖 [{}] chapter {current} --> {target}", cx.name());
        let steps = (0..delta.unsigned_abs())
            .flat_map(|_| [Action::Click(button), Action::Pause(Duration::from_millis(300))])
            .collect();
        cx.perform(Action::Sequence(steps)).await?;
    }
    Ok(current)
}
