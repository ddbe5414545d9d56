//! Keyword video classifier
//!
//! Assigns a video to one of the content categories from its title,
//! description and tags by counting keyword hits. This is the offline
//! stand-in for an external analysis service.

use crate::dimension::Category;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Category assigned when no keyword matches
pub const DEFAULT_CATEGORY: Category = Category::Comedy;

/// Keyword hits needed for [`Confidence::High`]
pub const HIGH_CONFIDENCE_HITS: usize = 2;

/// Keywords per category, in priority order (earlier entries win ties).
/// Keywords are lowercase because the searched text is lowercased.
const CATEGORY_KEYWORDS: [(Category, &[&str]); 11] = [
    (
        Category::Knowledge,
        &["科普", "知识", "解读", "原理", "科学", "历史", "揭秘", "真相", "分析", "研究"],
    ),
    (
        Category::News,
        &["新闻", "资讯", "头条", "热点", "事件", "报道", "最新", "突发"],
    ),
    (
        Category::Tutorial,
        &["教程", "教学", "入门", "技巧", "学习", "怎么", "如何", "方法", "攻略"],
    ),
    (
        Category::EmotionalStory,
        &["情感", "故事", "爱情", "感人", "真实", "经历", "心酸", "泪目", "催泪"],
    ),
    (
        Category::Music,
        &["音乐", "mv", "歌曲", "翻唱", "原创", "演唱", "歌手", "专辑"],
    ),
    (
        Category::Inspirational,
        &["励志", "正能量", "加油", "坚持", "成功", "梦想", "奋斗", "努力"],
    ),
    (
        Category::Comedy,
        &["搞笑", "爆笑", "沙雕", "段子", "整蛊", "恶搞", "笑死", "哈哈"],
    ),
    (
        Category::Gaming,
        &["游戏", "直播", "电竞", "王者", "吃鸡", "英雄联盟", "mc", "原神"],
    ),
    (
        Category::Food,
        &["美食", "探店", "吃播", "测评", "好吃", "餐厅", "小吃", "做饭", "食谱"],
    ),
    (
        Category::Pets,
        &["宠物", "萌宠", "猫", "狗", "可爱", "萌", "喵", "汪"],
    ),
    (
        Category::SocialIssues,
        &["社会", "讨论", "观点", "评论", "思考", "现象", "问题", "争议"],
    ),
];

/// How much keyword evidence backs a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

/// Result of classifying one video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub confidence: Confidence,
    /// Keywords of the chosen category found in the text
    pub keyword_hits: usize,
}

/// Classify a video by keyword hits over its title, description and tags.
///
/// The category with the most hits wins; ties go to the earlier category in
/// the keyword table. With no hits at all the video is [`DEFAULT_CATEGORY`].
pub fn classify_video<T: AsRef<str>>(title: &str, description: &str, tags: &[T]) -> Classification {
    let tags: Vec<&str> = tags.iter().map(AsRef::as_ref).collect();
    let text = format!("{} {} {}", title, description, tags.join(" ")).to_lowercase();

    let mut category = DEFAULT_CATEGORY;
    let mut best = 0;
    for (candidate, keywords) in CATEGORY_KEYWORDS {
        let hits = keywords.iter().filter(|kw| text.contains(*kw)).count();
        if hits > best {
            best = hits;
            category = candidate;
        }
    }

    let confidence = if best >= HIGH_CONFIDENCE_HITS {
        Confidence::High
    } else {
        Confidence::Low
    };
    debug!(title, category = category.slug(), hits = best, "classified video");

    Classification {
        category,
        confidence,
        keyword_hits: best,
    }
}
