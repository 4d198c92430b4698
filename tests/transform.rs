use indoc::indoc;
use next_data_loader_codemod::{transform, Error, TransformOptions};
use pretty_assertions::assert_eq;
use regex::Regex;

const HELPER: &str = "/project/utils/buildLegacyCtx";

/// Code compared the way the migration's expectations are written: word
/// characters only.
fn normalize(code: &str) -> String {
    Regex::new(r"\W").unwrap().replace_all(code, "").into_owned()
}

fn migrate(source: &str) -> Option<String> {
    transform(source, &TransformOptions::new(HELPER)).unwrap()
}

fn assert_migrates_to(source: &str, expected: &str) {
    let output = migrate(source).expect("page should be rewritten");
    assert_eq!(normalize(&output), normalize(expected));

    // a migrated page has nothing left to migrate
    assert_eq!(migrate(&output), None);
}

#[test]
fn server_side_props_are_inlined_into_get_data() {
    let source = indoc! {r#"
        export async function getServerSideProps(ctx) {
            const users = await fetchUsers();
            return { props: { users } };
        }

        export default function Page({ users }) {
            return <div>{users.length}</div>;
        }
    "#};

    let expected = indoc! {r#"
        import { buildLegacyCtx } from "/project/utils/buildLegacyCtx";
        import { headers, cookies } from "next/headers";
        import { GetServerSidePropsContext } from "next";
        type Params = {
            [key: string]: string | string[] | undefined;
        };
        type PageProps = {
            params: Params;
            searchParams: Params;
        };
        export async function getServerSideProps(ctx) {
            const users = await fetchUsers();
            return { props: { users } };
        }
        async function getData(ctx: GetServerSidePropsContext) {
            const users = await fetchUsers();
            return { users };
        }
        export default async function Page({ params: pageParams, searchParams: pageSearchParams }: PageProps) {
            const legacyCtx = buildLegacyCtx(headers(), cookies(), pageParams, pageSearchParams);
            const { users } = await getData(legacyCtx);
            return <div>{users.length}</div>;
        }
    "#};

    assert_migrates_to(source, expected);
}

#[test]
fn static_props_returns_become_navigation_calls() {
    let source = indoc! {r#"
        export async function getStaticProps() {
            const res = await fetch("https://api.example.com/posts");
            const posts = await res.json();
            if (!posts) {
                return { notFound: true };
            }
            if (posts.length === 0) {
                return { redirect: { destination: "/empty", permanent: false } };
            }
            return { props: { posts }, revalidate: 60 };
        }

        function Blog({ posts }) {
            return <ul>{posts.map((post) => <li key={post.id}>{post.title}</li>)}</ul>;
        }

        export default Blog;
    "#};

    let expected = indoc! {r#"
        import { buildLegacyCtx } from "/project/utils/buildLegacyCtx";
        import { headers, cookies } from "next/headers";
        import { GetStaticPropsContext } from "next";
        import { notFound, redirect } from "next/navigation";
        type Params = {
            [key: string]: string | string[] | undefined;
        };
        type PageProps = {
            params: Params;
            searchParams: Params;
        };
        export async function getStaticProps() {
            const res = await fetch("https://api.example.com/posts");
            const posts = await res.json();
            if (!posts) {
                return { notFound: true };
            }
            if (posts.length === 0) {
                return { redirect: { destination: "/empty", permanent: false } };
            }
            return { props: { posts }, revalidate: 60 };
        }
        async function getData(props: GetStaticPropsContext) {
            const res = await fetch("https://api.example.com/posts");
            const posts = await res.json();
            if (!posts) {
                return notFound();
            }
            if (posts.length === 0) {
                return redirect("/empty");
            }
            return { posts };
        }
        async function Blog({ params: pageParams, searchParams: pageSearchParams }: PageProps) {
            const legacyCtx = buildLegacyCtx(headers(), cookies(), pageParams, pageSearchParams);
            const { posts } = await getData(legacyCtx);
            return <ul>{posts.map((post) => <li key={post.id}>{post.title}</li>)}</ul>;
        }
        export default Blog;
        export const revalidate = 60;
        export const dynamic = "force-static";
    "#};

    assert_migrates_to(source, expected);
}

#[test]
fn non_literal_returns_get_a_wrapper() {
    let source = indoc! {r#"
        export const getServerSideProps = async (ctx) => {
            const data = await load(ctx.params);
            return data;
        };

        const Page = ({ data }) => <main>{data.title}</main>;

        export default Page;
    "#};

    let expected = indoc! {r#"
        import { buildLegacyCtx } from "/project/utils/buildLegacyCtx";
        import { headers, cookies } from "next/headers";
        import { GetServerSidePropsContext } from "next";
        import { notFound, redirect } from "next/navigation";
        type Params = {
            [key: string]: string | string[] | undefined;
        };
        type PageProps = {
            params: Params;
            searchParams: Params;
        };
        export const getServerSideProps = async (ctx) => {
            const data = await load(ctx.params);
            return data;
        };
        async function getData(ctx: GetServerSidePropsContext) {
            const result = await getServerSideProps(ctx);
            if ("redirect" in result) {
                redirect(result.redirect.destination);
            }
            if ("notFound" in result) {
                notFound();
            }
            return "props" in result ? result.props : {};
        }
        const Page = async ({ params: pageParams, searchParams: pageSearchParams }: PageProps) => {
            const legacyCtx = buildLegacyCtx(headers(), cookies(), pageParams, pageSearchParams);
            const { data } = await getData(legacyCtx);
            return <main>{data.title}</main>;
        };
        export default Page;
    "#};

    assert_migrates_to(source, expected);
}

#[test]
fn static_paths_become_generate_static_params_and_dynamic_params() {
    let source = indoc! {r#"
        export async function getStaticPaths() {
            return { paths: [{ params: { id: "1" } }], fallback: "blocking" };
        }

        export async function getStaticProps({ params }) {
            return { props: { id: params.id } };
        }

        export default function Post({ id }) {
            return <p>{id}</p>;
        }
    "#};

    let expected = indoc! {r#"
        import { buildLegacyCtx } from "/project/utils/buildLegacyCtx";
        import { headers, cookies } from "next/headers";
        import { GetStaticPropsContext } from "next";
        type Params = {
            [key: string]: string | string[] | undefined;
        };
        type PageProps = {
            params: Params;
            searchParams: Params;
        };
        export async function getStaticPaths() {
            return { paths: [{ params: { id: "1" } }], fallback: "blocking" };
        }
        export async function generateStaticParams() {
            return (await getStaticPaths({})).paths;
        }
        export async function getStaticProps({ params }) {
            return { props: { id: params.id } };
        }
        async function getData({ params }: GetStaticPropsContext) {
            return { id: params.id };
        }
        export default async function Post({ params: pageParams, searchParams: pageSearchParams }: PageProps) {
            const legacyCtx = buildLegacyCtx(headers(), cookies(), pageParams, pageSearchParams);
            const { id } = await getData(legacyCtx);
            return <p>{id}</p>;
        }
        export const dynamicParams = true;
        export const dynamic = "force-static";
    "#};

    assert_migrates_to(source, expected);
}

#[test]
fn fallback_false_disables_dynamic_params() {
    let output = migrate(indoc! {r#"
        export async function getStaticPaths() {
            return { paths: [], fallback: false };
        }
    "#})
    .unwrap();

    let normalized = normalize(&output);
    assert!(normalized.contains("exportconstdynamicParamsfalse"));
    assert!(normalized.contains("exportasyncfunctiongenerateStaticParams"));
    assert_eq!(output.matches("dynamicParams").count(), 1);
}

#[test]
fn existing_dynamic_params_export_is_kept() {
    let output = migrate(indoc! {r#"
        export async function getStaticPaths() {
            return { paths: [], fallback: false };
        }

        export const dynamicParams = true;
    "#})
    .unwrap();

    let normalized = normalize(&output);
    assert!(normalized.contains("exportconstdynamicParamstrue"));
    assert!(!normalized.contains("dynamicParamsfalse"));
}

#[test]
fn navigation_imports_are_added_once() {
    let output = migrate(indoc! {r#"
        export async function getStaticProps({ params }) {
            const target = "/new";
            if (!params) return { notFound: true };
            if (params.old) return { notFound: true };
            if (params.moved) return { redirect: { destination: target } };
            return { props: {} };
        }
    "#})
    .unwrap();

    assert_eq!(output.matches("next/navigation").count(), 1);
    assert_eq!(output.matches("notFound()").count(), 2);
    assert!(normalize(&output).contains("returnredirecttarget"));
}

#[test]
fn spread_returns_keep_the_data_function_behind_a_wrapper() {
    let output = migrate(indoc! {r#"
        export async function getServerSideProps() {
            const base = await load();
            if (base.hidden) return { ...base, props: {} };
            return { ...base, props: { a: 1 } };
        }
    "#})
    .unwrap();

    let normalized = normalize(&output);
    assert!(normalized.contains("returnbasepropsa1"));
    assert!(normalized.contains("constresultawaitgetServerSidePropsctx"));
    assert!(normalized.contains("returnpropsinresultresultprops"));
    assert_eq!(migrate(&output), None);
}

#[test]
fn expression_bodied_data_function_is_inlined() {
    let output = migrate(indoc! {r#"
        export const getStaticProps = async () => ({ props: { time: 1 } });

        export default function Home({ time }) {
            return <p>{time}</p>;
        }
    "#})
    .unwrap();

    let normalized = normalize(&output);
    assert!(normalized.contains("asyncfunctiongetDatapropsGetStaticPropsContextreturntime1"));
    assert!(!output.contains("next/navigation"));
}

#[test]
fn component_is_moved_between_get_data_and_its_export() {
    let output = migrate(indoc! {r#"
        function Page({ a }) {
            return <div>{a}</div>;
        }

        export async function getServerSideProps() {
            return { props: { a: 1 } };
        }

        export default Page;
    "#})
    .unwrap();

    let get_data = output.find("function getData").unwrap();
    let page = output.find("function Page").unwrap();
    assert!(get_data < page);
    assert!(normalize(&output).contains("returndivadivexportdefaultPage"));
}

#[test]
fn pages_without_data_fetching_are_left_alone() {
    assert_eq!(
        migrate("export default function About() { return <p>about</p>; }"),
        None
    );
    assert_eq!(migrate("export const getStaticPropsLater = () => ({});"), None);
}

#[test]
fn unparseable_pages_are_errors() {
    let err = transform("export default function (", &TransformOptions::new(HELPER)).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
}
