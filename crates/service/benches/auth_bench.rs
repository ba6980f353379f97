use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use models::UserRole;
use service::auth::domain::{AuthUser, LoginInput};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::service::{hash_password, AuthService, TokenConfig};
use service::authz::{can_act, Action, Caller, ResourceRef};

fn bench_login(c: &mut Criterion) {
    let repo = Arc::new(MockAuthRepository::default());
    repo.insert(AuthUser {
        id: uuid::Uuid::new_v4(),
        username: "bench".into(),
        email: "bench@example.com".into(),
        role: UserRole::Employee,
        active: true,
        password_hash: hash_password("Benchmark1").unwrap(),
    });
    let svc = AuthService::new(repo, TokenConfig { jwt_secret: "secret".into(), ttl_minutes: 30 });
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.login(LoginInput { username: "bench".into(), password: "Benchmark1".into() })).unwrap();
        });
    });
}

fn bench_can_act(c: &mut Criterion) {
    let caller = Caller { id: uuid::Uuid::new_v4(), role: UserRole::Employee, active: true };
    let own = ResourceRef::owned(caller.id, models::RequestStatus::Pending);
    c.bench_function("authz_can_act", |b| {
        b.iter(|| can_act(&caller, Action::Update, &own));
    });
}

criterion_group!(benches, bench_login, bench_can_act);
criterion_main!(benches);
