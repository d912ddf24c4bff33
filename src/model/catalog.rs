//! Seeded, session-only content: the initial feed and the static sample data
//! shown by sheets and secondary screens.

use super::identifiers::{AuthorId, CommentId, VideoId};
use super::video::{Author, Comment, Engagement, MediaRef, VideoItem};

/// One of the fixed AI analysis prompts offered by the analysis drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOption {
    /// Stable id echoed back with the analysis result.
    pub id: &'static str,
    /// Label shown in the picker.
    pub label: &'static str,
    /// Prompt sent with the media.
    pub prompt: &'static str,
}

/// The four options of the analysis picker.
pub const ANALYSIS_OPTIONS: [AnalysisOption; 4] = [
    AnalysisOption {
        id: "summary",
        label: "Summarize Actions",
        prompt: "Summarize the main key actions happening in this video.",
    },
    AnalysisOption {
        id: "objects",
        label: "Identify Objects",
        prompt: "List and describe the key objects and people visible in this video.",
    },
    AnalysisOption {
        id: "sentiment",
        label: "Analyze Sentiment",
        prompt: "Analyze the emotional sentiment and mood conveyed by this video.",
    },
    AnalysisOption {
        id: "tags",
        label: "Suggest Tags",
        prompt: "Suggest 5 highly relevant and trending hashtags based on this video content.",
    },
];

/// Destinations listed in the share sheet.
pub const SHARE_TARGETS: [&str; 8] = [
    "Copy Link",
    "WhatsApp",
    "Instagram",
    "SMS",
    "Save Video",
    "Report",
    "Not Interested",
    "Duet",
];

/// Status lines rotated while a video is generating.
pub const VIDEO_STATUS_MESSAGES: [&str; 7] = [
    "Gemini is drafting the perfect script...",
    "Analyzing visual themes for your prompt...",
    "Harnessing Veo 3.1 to generate temporal frames...",
    "Synchronizing motion and consistency...",
    "Applying cinematic lighting and textures...",
    "Rendering high-fidelity video sequences...",
    "Almost there! Polishing the final output...",
];

/// Status lines rotated while an image is generating.
pub const IMAGE_STATUS_MESSAGES: [&str; 4] = [
    "Gemini is sketching your vision...",
    "Adding intricate details and depth...",
    "Enhancing resolution and lighting...",
    "Finalizing your AI masterpiece...",
];

/// Stage lines rotated while a search is running.
pub const SEARCH_LOADING_STAGES: [&str; 4] = [
    "Accessing web knowledge...",
    "Consulting Google Search...",
    "Verifying facts...",
    "Synthesizing AI insight...",
];

/// Queries offered on the empty search screen.
pub const SUGGESTED_TOPICS: [&str; 4] = [
    "Latest tech breakthroughs",
    "Sports highlights today",
    "Trending songs right now",
    "World news summary",
];

/// Trending hashtags; each submits "Tell me about <tag> trends".
pub const TRENDING_TAGS: [&str; 5] = ["#AIart", "#Veo", "#cyberpunk", "#lofi", "#tokyo"];

/// Inbox notification row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboxMessage {
    /// Sender name.
    pub from: &'static str,
    /// Message body.
    pub text: &'static str,
    /// Relative time as displayed.
    pub ago: &'static str,
    /// Sent by the platform rather than a user.
    pub system: bool,
}

/// Category rows above the inbox messages.
pub const INBOX_CATEGORIES: [&str; 3] = ["New followers", "Mentions", "All activity"];

/// Sample inbox notifications.
pub const INBOX_MESSAGES: [InboxMessage; 4] = [
    InboxMessage {
        from: "Gemini AI",
        text: "Your video is trending in the AI category!",
        ago: "2m",
        system: true,
    },
    InboxMessage {
        from: "alex_j",
        text: "liked your comment.",
        ago: "1h",
        system: false,
    },
    InboxMessage {
        from: "pixel_art",
        text: "started following you.",
        ago: "4h",
        system: false,
    },
    InboxMessage {
        from: "Creative Team",
        text: "Check out the new Veo 3.1 features!",
        ago: "1d",
        system: true,
    },
];

/// A settings row. `opens_credential_prompt` marks the API settings entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsItem {
    /// Row title.
    pub label: &'static str,
    /// Secondary text under the title.
    pub description: &'static str,
    /// Selecting the row opens the API key prompt.
    pub opens_credential_prompt: bool,
}

const fn item(label: &'static str, description: &'static str) -> SettingsItem {
    SettingsItem {
        label,
        description,
        opens_credential_prompt: false,
    }
}

/// Settings screen sections and their rows.
pub const SETTINGS_SECTIONS: [(&str, &[SettingsItem]); 4] = [
    (
        "Account",
        &[
            item("Manage account", "Phone, email, password"),
            item("Privacy", "Who can see your content"),
            item("Security and login", "Two-step verification"),
            item("Share profile", "Copy link, QR code"),
        ],
    ),
    (
        "AI & Creation",
        &[
            SettingsItem {
                label: "Gemini API Settings",
                description: "Manage your AI project and billing",
                opens_credential_prompt: true,
            },
            item("AI Content Preferences", "Customize creation style"),
            item("Veo Video Quality", "720p, 1080p, and frame rate"),
        ],
    ),
    (
        "Content & Activity",
        &[
            item("Playback", "Auto-play, captions"),
            item("Language", "App and content language"),
            item("Watch history", "View your activity"),
        ],
    ),
    (
        "Support & Legal",
        &[
            item("Help Center", "Guides and support"),
            item("Terms and Privacy", "Our legal agreements"),
            item("About reelfeed", concat!("Version ", env!("CARGO_PKG_VERSION"))),
        ],
    ),
];

/// Accounts suggested on the Friends screen.
pub const FRIEND_SUGGESTIONS: [&str; 5] = [
    "neon_vibes",
    "nature_lofi",
    "pixel_art",
    "creativ_soul",
    "tech_guru",
];

/// Account id used for items created in this session.
pub const SELF_AUTHOR_ID: &str = "me";

/// Accounts that own items created in this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creator {
    /// The local user (camera recordings).
    Me,
    /// The video generation model.
    VideoModel,
    /// The image generation model.
    ImageModel,
}

impl Creator {
    /// Author record for items this creator publishes.
    pub fn author(self) -> Author {
        let (id, name, seed) = match self {
            Creator::Me => (SELF_AUTHOR_ID, "me", "me"),
            Creator::VideoModel => ("ai_creator", "gemini_veo", "veo"),
            Creator::ImageModel => ("ai_creator", "gemini_image", "proimg"),
        };
        Author::new(
            AuthorId::from_static(id),
            name,
            format!("https://picsum.photos/seed/{seed}/100/100"),
            false,
        )
    }
}

/// Sample comments shown in every comments sheet.
pub fn sample_comments() -> Vec<Comment> {
    [
        ("c1", "alex_j", "This is actually insane! How did you edit this? 🔥", 124, "2h"),
        ("c2", "pixel_art", "The lighting is perfect. Reminds me of Blade Runner.", 89, "5h"),
        ("c3", "creativ_soul", "Gemini really did a great job on this prompt.", 45, "1d"),
        ("c4", "tech_guru", "Wait, is this really AI? The temporal consistency is 10/10.", 231, "3h"),
    ]
    .into_iter()
    .filter_map(|(id, author, text, likes, ago)| {
        Some(Comment {
            id: CommentId::new(id).ok()?,
            author_name: author.to_string(),
            text: text.to_string(),
            likes,
            posted_ago: ago.to_string(),
        })
    })
    .collect()
}

fn author(id: &str, name: &str, following: bool) -> Option<Author> {
    Some(Author::new(
        AuthorId::new(id).ok()?,
        name,
        format!("https://picsum.photos/seed/{id}/100/100"),
        following,
    ))
}

/// The feed shown at startup.
pub fn initial_feed() -> Vec<VideoItem> {
    let mut items = Vec::new();

    if let (Ok(id), Some(author)) = (VideoId::new("v1"), author("u1", "neon_vibes", false)) {
        items.push(VideoItem {
            id,
            media: MediaRef::Remote(
                "https://assets.mixkit.co/videos/preview/mixkit-girl-in-neon-lighting-in-the-city-21013-large.mp4"
                    .to_string(),
            ),
            author,
            description: "Neon nights in the city. #cyberpunk #neon #tokyo".to_string(),
            tags: vec!["cyberpunk".into(), "neon".into(), "tokyo".into()],
            engagement: Engagement {
                likes: 12_400,
                comments: 850,
                shares: 1_200,
            },
            audio_label: "Original Sound - Night City".to_string(),
        });
    }

    if let (Ok(id), Some(author)) = (VideoId::new("v2"), author("u2", "nature_lofi", true)) {
        items.push(VideoItem {
            id,
            media: MediaRef::Remote(
                "https://assets.mixkit.co/videos/preview/mixkit-waves-in-the-ocean-near-a-shore-1188-large.mp4"
                    .to_string(),
            ),
            author,
            description: "Calm waves to start your day. 🌊 #ocean #calm #aesthetic".to_string(),
            tags: vec!["ocean".into(), "calm".into(), "aesthetic".into()],
            engagement: Engagement {
                likes: 8_900,
                comments: 420,
                shares: 310,
            },
            audio_label: "Nature Lo-Fi Beats".to_string(),
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_feed_has_two_items_in_order() {
        let feed = initial_feed();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id.as_str(), "v1");
        assert_eq!(feed[1].id.as_str(), "v2");
        assert!(!feed[0].author.following);
        assert!(feed[1].author.following);
    }

    #[test]
    fn sample_comments_are_complete() {
        let comments = sample_comments();
        assert_eq!(comments.len(), 4);
        assert_eq!(comments[3].likes, 231);
    }

    #[test]
    fn exactly_one_settings_item_opens_credential_prompt() {
        let count = SETTINGS_SECTIONS
            .iter()
            .flat_map(|(_, items)| items.iter())
            .filter(|i| i.opens_credential_prompt)
            .count();
        assert_eq!(count, 1);
    }
}
