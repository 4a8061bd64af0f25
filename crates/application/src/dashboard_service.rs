use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use warden_core::{AppResult, PlanId, UserIdentity};
use warden_domain::{Action, Plan, Subject, Team};

use crate::{AuthorizationService, PlanRepository, TeamRepository, UserRepository};

const WEEKS_SHOWN: i64 = 8;

/// Number of users subscribed to one plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDistributionEntry {
    /// Plan identifier.
    pub plan_id: PlanId,
    /// Plan display name.
    pub plan_name: String,
    /// Subscribed users.
    pub users: usize,
}

/// Teams created during one week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyTeamsEntry {
    /// Exclusive start of the week.
    pub week_start: DateTime<Utc>,
    /// Teams created after `week_start` and up to seven days later.
    pub teams: usize,
}

/// Subscription revenue derived from plan prices.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueStats {
    /// Sum of plan price times subscribers.
    pub monthly_revenue: f64,
    /// Users on a plan with a positive price.
    pub active_subscribers: usize,
    /// Share of users that are active subscribers, in whole percent.
    pub activity_rate: u8,
}

/// Aggregate figures for the administrative dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOverview {
    /// Registered users.
    pub total_users: usize,
    /// Existing teams.
    pub total_teams: usize,
    /// Users per plan, including plans nobody uses.
    pub plan_distribution: Vec<PlanDistributionEntry>,
    /// Team creations over the last eight weeks, oldest week first.
    pub weekly_teams: Vec<WeeklyTeamsEntry>,
    /// Revenue figures.
    pub revenue: RevenueStats,
}

/// Application service computing dashboard aggregates.
#[derive(Clone)]
pub struct DashboardService {
    authorization_service: AuthorizationService,
    users: Arc<dyn UserRepository>,
    teams: Arc<dyn TeamRepository>,
    plans: Arc<dyn PlanRepository>,
}

impl DashboardService {
    /// Creates a new dashboard service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        users: Arc<dyn UserRepository>,
        teams: Arc<dyn TeamRepository>,
        plans: Arc<dyn PlanRepository>,
    ) -> Self {
        Self {
            authorization_service,
            users,
            teams,
            plans,
        }
    }

    /// Returns the dashboard figures as of now.
    pub async fn overview(&self, actor: &UserIdentity) -> AppResult<DashboardOverview> {
        self.overview_at(actor, Utc::now()).await
    }

    /// Returns the dashboard figures with weekly buckets ending at `now`.
    pub async fn overview_at(
        &self,
        actor: &UserIdentity,
        now: DateTime<Utc>,
    ) -> AppResult<DashboardOverview> {
        self.authorization_service
            .require_permission(actor, Action::Read, Subject::Dashboard)
            .await?;

        let users = self.users.list_users().await?;
        let teams = self.teams.list_teams().await?;
        let plans = self.plans.list_plans().await?;

        let mut per_plan: HashMap<&PlanId, usize> = HashMap::new();
        for user in &users {
            *per_plan.entry(&user.plan_id).or_default() += 1;
        }

        let plan_distribution = plans
            .iter()
            .map(|plan| PlanDistributionEntry {
                plan_id: plan.id.clone(),
                plan_name: plan.name.to_string(),
                users: per_plan.get(&plan.id).copied().unwrap_or_default(),
            })
            .collect();
        let revenue = revenue_stats(&plans, &per_plan, users.len());

        Ok(DashboardOverview {
            total_users: users.len(),
            total_teams: teams.len(),
            plan_distribution,
            weekly_teams: weekly_teams(&teams, now),
            revenue,
        })
    }
}

fn weekly_teams(teams: &[Team], now: DateTime<Utc>) -> Vec<WeeklyTeamsEntry> {
    (0..WEEKS_SHOWN)
        .rev()
        .map(|weeks_ago| {
            let week_end = now - Duration::weeks(weeks_ago);
            let week_start = week_end - Duration::weeks(1);
            let created = teams
                .iter()
                .filter(|team| team.created_at > week_start && team.created_at <= week_end)
                .count();

            WeeklyTeamsEntry {
                week_start,
                teams: created,
            }
        })
        .collect()
}

fn revenue_stats(
    plans: &[Plan],
    per_plan: &HashMap<&PlanId, usize>,
    total_users: usize,
) -> RevenueStats {
    let mut monthly_revenue = 0.0;
    let mut active_subscribers = 0;
    for plan in plans {
        let subscribers = per_plan.get(&plan.id).copied().unwrap_or_default();
        monthly_revenue += plan.price * f64::from(u32::try_from(subscribers).unwrap_or(u32::MAX));
        if plan.price > 0.0 {
            active_subscribers += subscribers;
        }
    }

    let activity_rate = if total_users == 0 {
        0
    } else {
        u8::try_from((active_subscribers * 100 + total_users / 2) / total_users).unwrap_or(100)
    };

    RevenueStats {
        monthly_revenue,
        active_subscribers,
        activity_rate,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{DateTime, Duration, Utc};
    use warden_core::{NonEmptyString, PlanId, TeamId, UserId};
    use warden_domain::{Plan, Team};

    use super::{revenue_stats, weekly_teams};

    fn plan(id: &str, price: f64) -> Plan {
        Plan {
            id: PlanId::new(id).unwrap_or_else(|_| unreachable!()),
            name: NonEmptyString::new(format!("Plan {id}")).unwrap_or_else(|_| unreachable!()),
            price,
            price_description: NonEmptyString::new("/month").unwrap_or_else(|_| unreachable!()),
            description: None,
        }
    }

    fn team(id: &str, created_at: DateTime<Utc>) -> Team {
        Team {
            id: TeamId::new(id).unwrap_or_else(|_| unreachable!()),
            name: NonEmptyString::new(id).unwrap_or_else(|_| unreachable!()),
            owner_id: UserId::new("1").unwrap_or_else(|_| unreachable!()),
            created_at,
        }
    }

    #[test]
    fn weeks_run_oldest_first_and_skip_older_teams() {
        let now = Utc::now();
        let teams = vec![
            team("this-week", now - Duration::days(1)),
            team("also-this-week", now),
            team("three-weeks", now - Duration::days(17)),
            team("too-old", now - Duration::weeks(9)),
        ];

        let weeks = weekly_teams(&teams, now);
        let counts: Vec<usize> = weeks.iter().map(|week| week.teams).collect();

        assert_eq!(counts, vec![0, 0, 0, 0, 0, 1, 0, 2]);
        assert_eq!(weeks[0].week_start, now - Duration::weeks(8));
    }

    #[test]
    fn free_plans_add_no_revenue_or_subscribers() {
        let plans = vec![plan("free", 0.0), plan("pro", 10.0)];
        let free = PlanId::new("free").unwrap_or_else(|_| unreachable!());
        let pro = PlanId::new("pro").unwrap_or_else(|_| unreachable!());
        let per_plan = HashMap::from([(&free, 2), (&pro, 1)]);

        let stats = revenue_stats(&plans, &per_plan, 3);

        assert!((stats.monthly_revenue - 10.0).abs() < f64::EPSILON);
        assert_eq!(stats.active_subscribers, 1);
        assert_eq!(stats.activity_rate, 33);
    }

    #[test]
    fn no_users_means_no_activity() {
        let stats = revenue_stats(&[plan("pro", 10.0)], &HashMap::new(), 0);

        assert_eq!(stats.active_subscribers, 0);
        assert_eq!(stats.activity_rate, 0);
    }
}
