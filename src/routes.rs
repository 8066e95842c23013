use crate::{
    api::{auth, company, employee, organization, payroll, payroll_upload, seed, user},
    config::Config,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Login sits outside the api prefix; everything else lives under it.
    cfg.service(
        web::scope("/auth").service(web::resource("/login").route(web::post().to(auth::login))),
    );

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/organization")
                    .service(
                        web::resource("")
                            .route(web::get().to(organization::list_organizations))
                            .route(web::post().to(organization::create_organization)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(organization::get_organization))
                            .route(web::put().to(organization::update_organization))
                            .route(web::delete().to(organization::delete_organization)),
                    ),
            )
            .service(
                web::scope("/user")
                    .service(
                        web::resource("")
                            .route(web::get().to(user::list_users))
                            .route(web::post().to(user::create_user)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(
                web::scope("/company")
                    .service(
                        web::resource("")
                            .route(web::get().to(company::list_companies))
                            .route(web::post().to(company::create_company)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(company::get_company))
                            .route(web::put().to(company::update_company))
                            .route(web::delete().to(company::delete_company)),
                    ),
            )
            .service(
                web::scope("/employee")
                    .service(web::resource("").route(web::post().to(employee::create_employee)))
                    // Bulk fix; registered before /{id} so "update" is not
                    // swallowed by the id matcher.
                    .service(web::resource("/update").route(web::post().to(employee::fix_employees)))
                    .service(
                        web::resource("/upload/{company_id}")
                            .route(web::post().to(employee::upload_employees)),
                    )
                    .service(
                        web::resource("/has-errors/{company_id}")
                            .route(web::get().to(employee::employees_with_errors)),
                    )
                    .service(
                        web::resource("/company/{company_id}")
                            .route(web::delete().to(employee::delete_company_employees)),
                    )
                    // GET lists by company id, PUT/DELETE address an employee id.
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::list_employees))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/payrollmonth")
                    .service(
                        web::resource("")
                            .route(web::get().to(payroll::list_payroll_months))
                            .route(web::post().to(payroll::create_payroll_month)),
                    )
                    .service(
                        web::resource("/company/{company_id}")
                            .route(web::get().to(payroll::list_company_payroll_months)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll_month))
                            .route(web::put().to(payroll::update_payroll_month))
                            .route(web::delete().to(payroll::delete_payroll_month)),
                    ),
            )
            .service(
                web::scope("/payroll-upload")
                    .service(
                        web::resource("/can-upload/{company_id}")
                            .route(web::get().to(payroll_upload::can_upload)),
                    )
                    .service(
                        web::resource("/upload/{company_id}/{month_id}")
                            .route(web::post().to(payroll_upload::upload_payroll)),
                    )
                    .service(
                        web::resource("/payroll/{company_id}/{month_id}")
                            .route(web::get().to(payroll_upload::list_entries)),
                    )
                    .service(
                        web::resource("/add-entry/{company_id}/{month_id}")
                            .route(web::post().to(payroll_upload::add_entry)),
                    )
                    .service(
                        web::resource("/update-entry/{id}")
                            .route(web::put().to(payroll_upload::update_entry)),
                    )
                    .service(
                        web::resource("/delete-entry/{id}")
                            .route(web::delete().to(payroll_upload::delete_entry)),
                    )
                    .service(
                        web::resource("/can-download/{company_id}/{month_id}")
                            .route(web::get().to(payroll_upload::can_download)),
                    )
                    .service(
                        web::resource("/download-pf/{company_id}/{month_id}")
                            .route(web::get().to(payroll_upload::download_pf)),
                    )
                    .service(
                        web::resource("/download-esi/{company_id}/{month_id}")
                            .route(web::get().to(payroll_upload::download_esi)),
                    ),
            )
            .service(
                web::scope("/seed")
                    .service(
                        web::resource("/create-admin").route(web::post().to(seed::create_admin)),
                    )
                    .service(web::resource("/seed-all").route(web::post().to(seed::seed_all))),
            ),
    );
}
