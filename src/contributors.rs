// Contributor profiles.
// Pages through repository contributors, enriches them from user profiles, and assigns roles.

use std::fmt;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::github::{ContributionSource, PageLimits, RepoContributor, RepoId, collect_pages};

const DEFAULT_BIO: &str = "Open source contributor";

/// Community role derived from GitHub activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ProjectLead,
    CoreMaintainer,
    ActiveContributor,
    RegularContributor,
    NewContributor,
}

impl Role {
    pub fn title(&self) -> &'static str {
        match self {
            Role::ProjectLead => "Project Lead",
            Role::CoreMaintainer => "Core Maintainer",
            Role::ActiveContributor => "Active Contributor",
            Role::RegularContributor => "Regular Contributor",
            Role::NewContributor => "New Contributor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Contributor with profile details, as shown in the contributors view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorProfile {
    pub login: String,
    pub name: String,
    pub avatar: Option<String>,
    pub profile: Option<String>,
    pub contributions: u64,
    pub followers: u64,
    pub public_repos: u64,
    pub bio: String,
    pub company: Option<String>,
    pub location: Option<String>,
    pub role: Role,
}

/// Assign a role. The lead login match is case-insensitive.
pub fn assign_role(login: &str, contributions: u64, followers: u64, lead: Option<&str>) -> Role {
    if lead.is_some_and(|lead| lead.eq_ignore_ascii_case(login)) {
        return Role::ProjectLead;
    }

    if contributions > 100 && followers > 50 {
        Role::CoreMaintainer
    } else if contributions > 20 {
        Role::ActiveContributor
    } else if contributions > 10 {
        Role::RegularContributor
    } else {
        Role::NewContributor
    }
}

/// Enrich one contributor. Profile lookup failures fall back to defaults.
async fn enrich<S: ContributionSource + ?Sized>(
    source: &S,
    contributor: RepoContributor,
    lead: Option<&str>,
) -> ContributorProfile {
    let (name, followers, public_repos, bio, company, location) =
        match source.user_profile(&contributor.login).await {
            Ok(p) => (
                p.name.filter(|n| !n.trim().is_empty()),
                p.followers,
                p.public_repos,
                p.bio.filter(|b| !b.trim().is_empty()),
                p.company,
                p.location,
            ),
            Err(e) => {
                debug!(login = %contributor.login, error = %e, "profile lookup failed");
                (None, 0, 0, None, None, None)
            }
        };

    ContributorProfile {
        role: assign_role(&contributor.login, contributor.contributions, followers, lead),
        name: name
            .or(contributor.name)
            .unwrap_or_else(|| contributor.login.clone()),
        avatar: contributor.avatar_url,
        profile: contributor.html_url,
        contributions: contributor.contributions,
        followers,
        public_repos,
        bio: bio.unwrap_or_else(|| DEFAULT_BIO.to_string()),
        company,
        location,
        login: contributor.login,
    }
}

/// Fetch every contributor and enrich them with bounded concurrency.
///
/// Result is ordered by contributions descending, then login.
pub async fn fetch_contributors<S: ContributionSource + ?Sized>(
    source: &S,
    repo: &RepoId,
    lead: Option<&str>,
    limits: PageLimits,
    concurrency: usize,
) -> Result<Vec<ContributorProfile>> {
    let endpoint = format!("{}/contributors", repo.api_path());
    let directory = collect_pages(&endpoint, limits, move |page| {
        source.contributors_page(repo, page, limits.per_page)
    })
    .await?;

    let mut profiles: Vec<ContributorProfile> = stream::iter(directory)
        .map(|contributor| enrich(source, contributor, lead))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    profiles.sort_by(|a, b| {
        b.contributions
            .cmp(&a.contributions)
            .then_with(|| a.login.cmp(&b.login))
    });

    info!(repo = %repo, contributors = profiles.len(), "loaded contributor profiles");
    Ok(profiles)
}
