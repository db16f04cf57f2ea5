// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub REST adapter: repository analytics, search and "trending".
//!
//! A token is optional; without one GitHub applies the anonymous rate limit.
//! GitHub has no trending endpoint, so trending is a date-filtered search.

use crate::services::fetch::{round2, Fetched, Upstream};
use chrono::{Duration as DateDelta, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

const BASE_URL: &str = "https://api.github.com";
const ACCEPT: &str = "application/vnd.github.v3+json";

pub const DEFAULT_CONTRIBUTORS_LIMIT: u32 = 100;
pub const DEFAULT_COMMITS_LIMIT: u32 = 100;
pub const DEFAULT_ISSUES_LIMIT: u32 = 100;
pub const DEFAULT_PULLS_LIMIT: u32 = 50;
pub const DEFAULT_TRENDING_LIMIT: u32 = 30;
pub const DEFAULT_STATE: &str = "all";

/// Time window for trending repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingWindow {
    Daily,
    Weekly,
    /// Anything else: well-starred repositories regardless of age.
    AllTime,
}

impl TrendingWindow {
    pub fn parse(since: &str) -> Self {
        match since {
            "daily" => TrendingWindow::Daily,
            "weekly" => TrendingWindow::Weekly,
            _ => TrendingWindow::AllTime,
        }
    }
}

/// Build the search query behind a trending listing.
pub fn trending_query(language: Option<&str>, window: TrendingWindow, today: NaiveDate) -> String {
    let mut query = match window {
        TrendingWindow::Daily => format!("created:>={}", today - DateDelta::days(1)),
        TrendingWindow::Weekly => format!("created:>={}", today - DateDelta::days(7)),
        TrendingWindow::AllTime => "stars:>1000".to_string(),
    };
    if let Some(lang) = language.filter(|l| !l.is_empty()) {
        query.push_str(" language:");
        query.push_str(lang);
    }
    query
}

/// Parameters for repository search.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RepoSearchParams {
    #[serde(rename = "q")]
    pub query: String,
    pub sort: String,
    pub order: String,
    pub page: u32,
    pub per_page: u32,
    /// Cap on returned items; also caps `per_page`.
    pub limit: Option<u32>,
}

impl Default for RepoSearchParams {
    fn default() -> Self {
        Self {
            query: String::new(),
            sort: "stars".to_string(),
            order: "desc".to_string(),
            page: 1,
            per_page: 30,
            limit: None,
        }
    }
}

/// GitHub client.
#[derive(Clone)]
pub struct GitHubClient {
    upstream: Upstream,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(http: reqwest::Client, token: Option<String>) -> Self {
        Self {
            upstream: Upstream::new(http, "github", BASE_URL),
            token,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.upstream.set_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.upstream.set_timeout(timeout);
        self
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.upstream.get(path).header(reqwest::header::ACCEPT, ACCEPT);
        match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn repo_path(owner: &str, repo: &str, suffix: &str) -> String {
        format!(
            "/repos/{}/{}{}",
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            suffix
        )
    }

    /// Remaining core API calls for the current credential.
    pub async fn rate_limit_remaining(&self) -> Fetched<u64> {
        self.upstream
            .fetch("rate_limit", self.get("/rate_limit"), |raw: RawRateLimit| {
                raw.rate.and_then(|r| r.remaining).unwrap_or(0)
            })
            .await
    }

    /// Usable while the rate limit has calls left.
    pub async fn check_status(&self) -> bool {
        matches!(self.rate_limit_remaining().await, Fetched::Data(n) if n > 0)
    }

    pub async fn repository(&self, owner: &str, repo: &str) -> Fetched<Repository> {
        let request = self.get(&Self::repo_path(owner, repo, ""));
        self.upstream
            .fetch("repository", request, RawRepository::into_repository)
            .await
    }

    pub async fn contributors(
        &self,
        owner: &str,
        repo: &str,
        limit: u32,
    ) -> Fetched<Vec<Contributor>> {
        let request = self
            .get(&Self::repo_path(owner, repo, "/contributors"))
            .query(&[("per_page", limit)]);

        self.upstream
            .fetch("contributors", request, |raw: Vec<RawContributor>| {
                raw.into_iter()
                    .map(|c| Contributor {
                        login: c.login.unwrap_or_default(),
                        contributions: c.contributions.unwrap_or(0),
                        avatar_url: c.avatar_url.unwrap_or_default(),
                        html_url: c.html_url.unwrap_or_default(),
                    })
                    .collect()
            })
            .await
    }

    /// Bytes per language with each language's share of the total.
    pub async fn languages(
        &self,
        owner: &str,
        repo: &str,
    ) -> Fetched<BTreeMap<String, LanguageShare>> {
        let request = self.get(&Self::repo_path(owner, repo, "/languages"));
        self.upstream
            .fetch("languages", request, language_shares)
            .await
    }

    pub async fn commits(
        &self,
        owner: &str,
        repo: &str,
        since: Option<&str>,
        until: Option<&str>,
        limit: u32,
    ) -> Fetched<Vec<CommitSummary>> {
        let mut query = vec![("per_page", limit.to_string())];
        if let Some(since) = since {
            query.push(("since", since.to_string()));
        }
        if let Some(until) = until {
            query.push(("until", until.to_string()));
        }
        let request = self
            .get(&Self::repo_path(owner, repo, "/commits"))
            .query(&query);

        self.upstream
            .fetch("commits", request, |raw: Vec<RawCommit>| {
                raw.into_iter().map(RawCommit::into_summary).collect()
            })
            .await
    }

    /// Issues only; pull requests listed by the issues endpoint are dropped.
    pub async fn issues(
        &self,
        owner: &str,
        repo: &str,
        state: &str,
        limit: u32,
    ) -> Fetched<Vec<IssueSummary>> {
        let request = self
            .get(&Self::repo_path(owner, repo, "/issues"))
            .query(&[("state", state.to_string()), ("per_page", limit.to_string())]);

        self.upstream
            .fetch("issues", request, |raw: Vec<RawIssue>| {
                raw.into_iter()
                    .filter(|issue| issue.pull_request.is_none())
                    .map(RawIssue::into_summary)
                    .collect()
            })
            .await
    }

    pub async fn pull_requests(
        &self,
        owner: &str,
        repo: &str,
        state: &str,
        limit: u32,
    ) -> Fetched<Vec<IssueSummary>> {
        let request = self
            .get(&Self::repo_path(owner, repo, "/pulls"))
            .query(&[("state", state.to_string()), ("per_page", limit.to_string())]);

        self.upstream
            .fetch("pull_requests", request, |raw: Vec<RawIssue>| {
                raw.into_iter().map(RawIssue::into_summary).collect()
            })
            .await
    }

    pub async fn releases(&self, owner: &str, repo: &str) -> Fetched<Vec<ReleaseSummary>> {
        let request = self.get(&Self::repo_path(owner, repo, "/releases"));
        self.upstream
            .fetch("releases", request, |raw: Vec<RawRelease>| {
                raw.into_iter().map(RawRelease::into_summary).collect()
            })
            .await
    }

    pub async fn search_repositories(
        &self,
        params: &RepoSearchParams,
    ) -> Fetched<Vec<RepoSummary>> {
        let per_page = params
            .limit
            .map_or(params.per_page, |limit| limit.min(params.per_page));
        let request = self.get("/search/repositories").query(&[
            ("q", params.query.clone()),
            ("sort", params.sort.clone()),
            ("order", params.order.clone()),
            ("page", params.page.to_string()),
            ("per_page", per_page.to_string()),
        ]);
        let limit = params.limit.map(|l| l as usize);

        self.upstream
            .fetch("search_repositories", request, |raw: RawSearch| {
                let items = raw.items.unwrap_or_default().into_iter();
                let items: Vec<RawRepository> = match limit {
                    Some(limit) => items.take(limit).collect(),
                    None => items.collect(),
                };
                items.into_iter().map(RawRepository::into_summary).collect()
            })
            .await
    }

    /// Recently created or highly starred repositories.
    pub async fn trending(
        &self,
        language: Option<&str>,
        window: TrendingWindow,
        limit: u32,
    ) -> Fetched<Vec<RepoSummary>> {
        let params = RepoSearchParams {
            query: trending_query(language, window, Utc::now().date_naive()),
            limit: Some(limit),
            ..RepoSearchParams::default()
        };
        self.search_repositories(&params).await
    }

    /// Every analytics view of one repository, fetched concurrently.
    pub async fn full_report(&self, owner: &str, repo: &str) -> RepoReport {
        let (repository, contributors, languages, commits, issues, pull_requests, releases) =
            tokio::join!(
                self.repository(owner, repo),
                self.contributors(owner, repo, DEFAULT_CONTRIBUTORS_LIMIT),
                self.languages(owner, repo),
                self.commits(owner, repo, None, None, DEFAULT_COMMITS_LIMIT),
                self.issues(owner, repo, DEFAULT_STATE, DEFAULT_ISSUES_LIMIT),
                self.pull_requests(owner, repo, DEFAULT_STATE, DEFAULT_PULLS_LIMIT),
                self.releases(owner, repo),
            );

        RepoReport {
            repository: repository.into_option(),
            contributors: contributors.into_data(),
            languages: languages.into_data(),
            commits: commits.into_data(),
            issues: issues.into_data(),
            pull_requests: pull_requests.into_data(),
            releases: releases.into_data(),
        }
    }
}

fn language_shares(raw: BTreeMap<String, u64>) -> BTreeMap<String, LanguageShare> {
    let total: u64 = raw.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }
    raw.into_iter()
        .map(|(lang, bytes)| {
            let percentage = round2(bytes as f64 / total as f64 * 100.0);
            (lang, LanguageShare { bytes, percentage })
        })
        .collect()
}

// ─── Output Shapes ───────────────────────────────────────────

/// Search/trending result row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub url: String,
    pub owner: RepoOwner,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub language: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub default_branch: String,
    /// Repository size in KB
    pub size: u64,
    /// SPDX id, or license name when GitHub has no SPDX id
    pub license: Option<String>,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub contributions: u64,
    pub avatar_url: String,
    pub html_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub bytes: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub date: String,
    pub html_url: String,
}

/// Issue or pull request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub html_url: String,
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub name: String,
    pub tag_name: String,
    pub published_at: Option<String>,
    pub html_url: String,
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoReport {
    pub repository: Option<Repository>,
    pub contributors: Vec<Contributor>,
    pub languages: BTreeMap<String, LanguageShare>,
    pub commits: Vec<CommitSummary>,
    pub issues: Vec<IssueSummary>,
    pub pull_requests: Vec<IssueSummary>,
    pub releases: Vec<ReleaseSummary>,
}

// ─── Provider Payloads ───────────────────────────────────────

#[derive(Deserialize)]
struct RawRate {
    remaining: Option<u64>,
}

#[derive(Deserialize)]
struct RawRateLimit {
    rate: Option<RawRate>,
}

#[derive(Deserialize)]
struct RawUser {
    login: Option<String>,
}

fn login(user: Option<RawUser>) -> String {
    user.and_then(|u| u.login).unwrap_or_default()
}

#[derive(Deserialize)]
struct RawLicense {
    name: Option<String>,
    spdx_id: Option<String>,
}

#[derive(Deserialize)]
struct RawRepository {
    id: Option<u64>,
    name: Option<String>,
    full_name: Option<String>,
    description: Option<String>,
    html_url: Option<String>,
    stargazers_count: Option<u64>,
    watchers_count: Option<u64>,
    forks_count: Option<u64>,
    open_issues_count: Option<u64>,
    language: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    default_branch: Option<String>,
    size: Option<u64>,
    license: Option<RawLicense>,
    topics: Option<Vec<String>>,
    owner: Option<RawUser>,
}

impl RawRepository {
    fn into_repository(self) -> Repository {
        Repository {
            name: self.name.unwrap_or_default(),
            full_name: self.full_name.unwrap_or_default(),
            description: self.description,
            html_url: self.html_url.unwrap_or_default(),
            stargazers_count: self.stargazers_count.unwrap_or(0),
            watchers_count: self.watchers_count.unwrap_or(0),
            forks_count: self.forks_count.unwrap_or(0),
            open_issues_count: self.open_issues_count.unwrap_or(0),
            language: self.language,
            created_at: self.created_at.unwrap_or_default(),
            updated_at: self.updated_at.unwrap_or_default(),
            default_branch: self.default_branch.unwrap_or_default(),
            size: self.size.unwrap_or(0),
            license: self.license.and_then(|l| {
                l.spdx_id
                    .filter(|id| !id.is_empty() && id != "NOASSERTION")
                    .or(l.name)
            }),
            topics: self.topics.unwrap_or_default(),
        }
    }

    fn into_summary(self) -> RepoSummary {
        RepoSummary {
            id: self.id.unwrap_or(0),
            name: self.name.unwrap_or_default(),
            full_name: self.full_name.unwrap_or_default(),
            description: self.description,
            stars: self.stargazers_count.unwrap_or(0),
            forks: self.forks_count.unwrap_or(0),
            language: self.language,
            url: self.html_url.unwrap_or_default(),
            owner: RepoOwner {
                login: login(self.owner),
            },
        }
    }
}

#[derive(Deserialize)]
struct RawSearch {
    items: Option<Vec<RawRepository>>,
}

#[derive(Deserialize)]
struct RawContributor {
    login: Option<String>,
    contributions: Option<u64>,
    avatar_url: Option<String>,
    html_url: Option<String>,
}

#[derive(Deserialize)]
struct RawCommitAuthor {
    name: Option<String>,
    date: Option<String>,
}

#[derive(Deserialize)]
struct RawCommitBody {
    message: Option<String>,
    author: Option<RawCommitAuthor>,
}

#[derive(Deserialize)]
struct RawCommit {
    sha: Option<String>,
    commit: Option<RawCommitBody>,
    html_url: Option<String>,
}

impl RawCommit {
    fn into_summary(self) -> CommitSummary {
        let (message, author) = match self.commit {
            Some(body) => (body.message, body.author),
            None => (None, None),
        };
        let (author, date) = match author {
            Some(a) => (a.name, a.date),
            None => (None, None),
        };
        CommitSummary {
            sha: self.sha.unwrap_or_default(),
            message: message.unwrap_or_default(),
            author: author.unwrap_or_default(),
            date: date.unwrap_or_default(),
            html_url: self.html_url.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct RawIssue {
    number: Option<u64>,
    title: Option<String>,
    state: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
    html_url: Option<String>,
    user: Option<RawUser>,
    pull_request: Option<serde_json::Value>,
}

impl RawIssue {
    fn into_summary(self) -> IssueSummary {
        IssueSummary {
            number: self.number.unwrap_or(0),
            title: self.title.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            created_at: self.created_at.unwrap_or_default(),
            updated_at: self.updated_at.unwrap_or_default(),
            html_url: self.html_url.unwrap_or_default(),
            user: login(self.user),
        }
    }
}

#[derive(Deserialize)]
struct RawRelease {
    name: Option<String>,
    tag_name: Option<String>,
    published_at: Option<String>,
    html_url: Option<String>,
    author: Option<RawUser>,
}

impl RawRelease {
    fn into_summary(self) -> ReleaseSummary {
        let tag_name = self.tag_name.unwrap_or_default();
        ReleaseSummary {
            name: self
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| tag_name.clone()),
            tag_name,
            published_at: self.published_at,
            html_url: self.html_url.unwrap_or_default(),
            author: login(self.author),
        }
    }
}
