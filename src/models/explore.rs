use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 探索页固定每页 12 个创作者
pub const EXPLORE_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExploreSort {
    #[default]
    Newest,
    Popular,
    /// 与 popular 同实现, 单独的加权排序待产品定义
    Trending,
}

impl ExploreSort {
    pub fn canonical(self) -> ExploreSort {
        match self {
            ExploreSort::Trending => ExploreSort::Popular,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ExploreQuery {
    /// 按用户名/显示名子串过滤
    pub q: Option<String>,
    pub sort: Option<ExploreSort>,
    /// 只看开通了会员档位的创作者
    pub has_membership: Option<bool>,
    /// 只看有精选 Action Card 的创作者
    pub has_featured: Option<bool>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExploreCreatorItem {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub supporter_count: i64,
    pub member_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trending_collapses_to_popular() {
        assert_eq!(ExploreSort::Trending.canonical(), ExploreSort::Popular);
        assert_eq!(ExploreSort::Popular.canonical(), ExploreSort::Popular);
        assert_eq!(ExploreSort::Newest.canonical(), ExploreSort::Newest);
    }
}
