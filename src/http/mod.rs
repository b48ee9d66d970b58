pub mod dashboard_v1;
