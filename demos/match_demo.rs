//! Profile a small users document and analyze one pair

fn main() {
    let json = r#"[
        { "id": "user_001", "nickname": "Lin", "watchHistory": [
            { "videoId": "video_0001", "category": "知识科普", "watchPercent": 0.95, "duration": 180, "liked": true, "commented": false, "watchedAt": "2024-01-15T01:20:00Z", "isNightWatch": true },
            { "videoId": "video_0002", "category": "新闻资讯", "watchPercent": 0.6, "duration": 90, "liked": false, "commented": false, "watchedAt": "2024-01-15T12:05:00Z", "isNightWatch": false },
            { "videoId": "video_0003", "category": "音乐MV", "watchPercent": 0.85, "duration": 240, "liked": false, "commented": true, "watchedAt": "2024-01-16T20:40:00Z", "isNightWatch": false }
        ] },
        { "id": "user_002", "nickname": "Mei", "watchHistory": [
            { "videoId": "video_0004", "category": "情感故事", "watchPercent": 1.0, "duration": 300, "liked": true, "commented": true, "watchedAt": "2024-01-14T23:50:00Z", "isNightWatch": true },
            { "videoId": "video_0005", "category": "宠物萌宠", "watchPercent": 0.7, "duration": 45, "liked": true, "commented": false, "watchedAt": "2024-01-15T18:00:00Z", "isNightWatch": false },
            { "videoId": "video_0006", "category": "知识科普", "watchPercent": 0.4, "duration": 200, "liked": false, "commented": false, "watchedAt": "2024-01-16T09:30:00Z", "isNightWatch": false }
        ] }
    ]"#;

    match xian_universe::users_to_profiles(json) {
        Ok(profiles) => println!("{profiles}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }

    match xian_universe::match_users(json, "user_001", "user_002") {
        Ok(analysis) => println!("{analysis}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
