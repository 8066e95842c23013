use tokio::sync::{RwLock, RwLockReadGuard};

use crate::model::{Company, Employee, Organization, PayrollEntry, PayrollMonth, User};

/// Every entity set the service works over. Cloneable so a transaction can
/// work on a private copy and swap it in only when the whole mutation
/// sequence succeeded.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    next_id: u32,
    pub organizations: Vec<Organization>,
    pub users: Vec<User>,
    pub companies: Vec<Company>,
    pub employees: Vec<Employee>,
    pub payroll_months: Vec<PayrollMonth>,
    pub payroll_entries: Vec<PayrollEntry>,
}

impl Dataset {
    /// Single id sequence shared by all entity types.
    pub fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn organization(&self, id: u32) -> Option<&Organization> {
        self.organizations.iter().find(|o| o.id == id)
    }

    pub fn organization_mut(&mut self, id: u32) -> Option<&mut Organization> {
        self.organizations.iter_mut().find(|o| o.id == id)
    }

    pub fn user(&self, id: u32) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: u32) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn company(&self, id: u32) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn company_mut(&mut self, id: u32) -> Option<&mut Company> {
        self.companies.iter_mut().find(|c| c.id == id)
    }

    pub fn employee(&self, id: u32) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn employee_mut(&mut self, id: u32) -> Option<&mut Employee> {
        self.employees.iter_mut().find(|e| e.id == id)
    }

    pub fn payroll_month(&self, id: u32) -> Option<&PayrollMonth> {
        self.payroll_months.iter().find(|m| m.id == id)
    }

    pub fn payroll_month_mut(&mut self, id: u32) -> Option<&mut PayrollMonth> {
        self.payroll_months.iter_mut().find(|m| m.id == id)
    }

    pub fn payroll_entry(&self, id: u32) -> Option<&PayrollEntry> {
        self.payroll_entries.iter().find(|p| p.id == id)
    }

    pub fn payroll_entry_mut(&mut self, id: u32) -> Option<&mut PayrollEntry> {
        self.payroll_entries.iter_mut().find(|p| p.id == id)
    }

    pub fn company_employees(&self, company_id: u32) -> impl Iterator<Item = &Employee> {
        self.employees.iter().filter(move |e| e.company_id == company_id)
    }

    pub fn month_entries(
        &self,
        company_id: u32,
        payroll_month_id: u32,
    ) -> impl Iterator<Item = &PayrollEntry> {
        self.payroll_entries
            .iter()
            .filter(move |p| p.company_id == company_id && p.payroll_month_id == payroll_month_id)
    }

    /// Hard delete with cascade: an employee takes its payroll entries along.
    pub fn remove_employee(&mut self, id: u32) -> Option<Employee> {
        let pos = self.employees.iter().position(|e| e.id == id)?;
        let removed = self.employees.remove(pos);
        self.payroll_entries.retain(|p| p.employee_id != id);
        Some(removed)
    }

    /// Hard delete with cascade: employees, payroll months and entries go
    /// with the company. Organizations and users are soft-deleted instead;
    /// the two lifecycle policies are deliberate.
    pub fn remove_company(&mut self, id: u32) -> Option<Company> {
        let pos = self.companies.iter().position(|c| c.id == id)?;
        let removed = self.companies.remove(pos);
        self.employees.retain(|e| e.company_id != id);
        self.payroll_months.retain(|m| m.company_id != id);
        self.payroll_entries.retain(|p| p.company_id != id);
        Some(removed)
    }

    pub fn remove_payroll_month(&mut self, id: u32) -> Option<PayrollMonth> {
        let pos = self.payroll_months.iter().position(|m| m.id == id)?;
        let removed = self.payroll_months.remove(pos);
        self.payroll_entries.retain(|p| p.payroll_month_id != id);
        Some(removed)
    }

    pub fn remove_payroll_entry(&mut self, id: u32) -> Option<PayrollEntry> {
        let pos = self.payroll_entries.iter().position(|p| p.id == id)?;
        Some(self.payroll_entries.remove(pos))
    }

    /// Username uniqueness spans users and organizations, active or not.
    pub fn username_taken(&self, username: &str, exclude_user: Option<u32>, exclude_org: Option<u32>) -> bool {
        self.users
            .iter()
            .any(|u| u.username == username && Some(u.id) != exclude_user)
            || self
                .organizations
                .iter()
                .any(|o| o.username == username && Some(o.id) != exclude_org)
    }
}

/// Request-scoped storage collaborator. `transact` gives the all-or-nothing
/// boundary the upload paths rely on: the closure mutates a working copy and
/// the copy replaces the live dataset only on `Ok`.
pub struct Store {
    inner: RwLock<Dataset>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Dataset::default()),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Dataset> {
        self.inner.read().await
    }

    pub async fn transact<T, E>(
        &self,
        f: impl FnOnce(&mut Dataset) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self.inner.write().await;
        let mut working = guard.clone();
        let out = f(&mut working)?;
        *guard = working;
        Ok(out)
    }

    /// Infallible mutation; always commits.
    pub async fn mutate<T>(&self, f: impl FnOnce(&mut Dataset) -> T) -> T {
        let mut guard = self.inner.write().await;
        f(&mut guard)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn company(data: &mut Dataset) -> u32 {
        let id = data.next_id();
        data.companies.push(Company {
            id,
            name: "Acme".into(),
            pf_enabled: true,
            esi_enabled: true,
            organization_id: None,
        });
        id
    }

    fn employee(data: &mut Dataset, company_id: u32, name: &str) -> u32 {
        let id = data.next_id();
        data.employees.push(Employee {
            id,
            company_id,
            name: name.into(),
            joining_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            leaving_date: None,
            pf_number: format!("PF-{id}"),
            esi_number: format!("{id}"),
            is_active: true,
            error: None,
        });
        id
    }

    fn entry(data: &mut Dataset, employee_id: u32, company_id: u32, month_id: u32) {
        let id = data.next_id();
        data.payroll_entries.push(PayrollEntry {
            id,
            employee_id,
            company_id,
            payroll_month_id: month_id,
            working_days: Decimal::from(20),
            basic_da: Decimal::from(15000),
            gross_salary: Decimal::from(20000),
            ncp: Decimal::from(10),
            reason: 0,
        });
    }

    #[test]
    fn employee_delete_cascades_entries() {
        let mut data = Dataset::default();
        let c = company(&mut data);
        let e = employee(&mut data, c, "A");
        entry(&mut data, e, c, 99);
        assert!(data.remove_employee(e).is_some());
        assert!(data.payroll_entries.is_empty());
    }

    #[test]
    fn company_delete_cascades_everything() {
        let mut data = Dataset::default();
        let c = company(&mut data);
        let e = employee(&mut data, c, "A");
        let m = data.next_id();
        data.payroll_months.push(PayrollMonth {
            id: m,
            company_id: c,
            month: "August 2025".into(),
            total_days: 30,
        });
        entry(&mut data, e, c, m);
        assert!(data.remove_company(c).is_some());
        assert!(data.employees.is_empty());
        assert!(data.payroll_months.is_empty());
        assert!(data.payroll_entries.is_empty());
    }

    #[test]
    fn username_taken_spans_users_and_orgs() {
        let mut data = Dataset::default();
        let id = data.next_id();
        data.organizations.push(Organization {
            id,
            name: "Org".into(),
            username: "org1".into(),
            password: "pw".into(),
            is_active: false,
            created_date: Utc::now(),
        });
        // Inactive rows still hold their username.
        assert!(data.username_taken("org1", None, None));
        assert!(!data.username_taken("org1", None, Some(id)));
    }

    #[tokio::test]
    async fn transact_rolls_back_on_error() {
        let store = Store::new();
        let res: Result<(), &str> = store
            .transact(|data| {
                company(data);
                Err("boom")
            })
            .await;
        assert!(res.is_err());
        assert!(store.read().await.companies.is_empty());
    }

    #[tokio::test]
    async fn transact_commits_on_ok() {
        let store = Store::new();
        store
            .transact::<_, ()>(|data| {
                company(data);
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(store.read().await.companies.len(), 1);
    }
}
